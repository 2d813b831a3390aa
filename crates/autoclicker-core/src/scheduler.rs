//! Click scheduler state machine.
//!
//! Owns the run state, the repeating timer and the input port. It does not
//! spawn anything: the owner awaits [`ClickScheduler::next_tick`] and calls
//! [`ClickScheduler::tick`] on the same task that handles commands, so ticks
//! and commands never interleave.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!   ^        |          |
//!   +--------+----------+   (stop, or repeat count reached)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut scheduler = ClickScheduler::new(input);
//! scheduler.start(settings, observer); // clicks once immediately
//! loop {
//!     scheduler.next_tick().await;
//!     scheduler.tick(); // clicks unless paused
//! }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::future;

use crate::events::Event;
use crate::input::{ButtonPhase, InputPort};
use crate::notifier::RunObserver;
use crate::settings::{Point, RunSettings};
use crate::timer::RepeatingTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickerState {
    Idle,
    Running,
    /// Sub-state of Running: the timer keeps firing but ticks do nothing.
    Paused,
}

/// Snapshot of the scheduler as reported to the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    pub is_running: bool,
    pub is_paused: bool,
    pub click_count: u64,
}

impl RunState {
    pub fn state(&self) -> ClickerState {
        match (self.is_running, self.is_paused) {
            (false, _) => ClickerState::Idle,
            (true, false) => ClickerState::Running,
            (true, true) => ClickerState::Paused,
        }
    }

    /// Short human-readable status, e.g. for a tray tooltip.
    pub fn summary(&self) -> String {
        match self.state() {
            ClickerState::Idle => "Stopped".to_string(),
            ClickerState::Paused => format!("Paused ({} clicks)", self.click_count),
            ClickerState::Running => format!("Running ({} clicks)", self.click_count),
        }
    }
}

/// Everything that only exists while a run is active.
struct ActiveRun {
    settings: RunSettings,
    observer: Box<dyn RunObserver + Send>,
    timer: RepeatingTimer,
}

pub struct ClickScheduler<P> {
    input: P,
    state: ClickerState,
    click_count: u64,
    /// Last pointer position successfully read from the input port.
    last_position: Point,
    run: Option<ActiveRun>,
}

impl<P: InputPort> ClickScheduler<P> {
    pub fn new(input: P) -> Self {
        Self {
            input,
            state: ClickerState::Idle,
            click_count: 0,
            last_position: Point::default(),
            run: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> ClickerState {
        self.state
    }

    pub fn click_count(&self) -> u64 {
        self.click_count
    }

    pub fn is_running(&self) -> bool {
        self.state != ClickerState::Idle
    }

    pub fn is_paused(&self) -> bool {
        self.state == ClickerState::Paused
    }

    /// Whether a repeating timer is currently armed.
    pub fn is_armed(&self) -> bool {
        self.run.is_some()
    }

    /// Settings of the active run.
    pub fn settings(&self) -> Option<&RunSettings> {
        self.run.as_ref().map(|run| &run.settings)
    }

    pub fn run_state(&self) -> RunState {
        RunState {
            is_running: self.is_running(),
            is_paused: self.is_paused(),
            click_count: self.click_count,
        }
    }

    pub fn snapshot(&self) -> Event {
        Event::StateChanged {
            state: self.run_state(),
            at: Utc::now(),
        }
    }

    pub fn input(&self) -> &P {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut P {
        &mut self.input
    }

    /// Current pointer position, or the last known one if the query fails.
    pub fn pointer_position(&mut self) -> Point {
        match self.input.pointer_position() {
            Ok(point) => {
                self.last_position = point;
                point
            }
            Err(e) => {
                tracing::warn!(error = %e, fallback = %self.last_position, "pointer query failed");
                self.last_position
            }
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a run: reset the count, arm the timer and click once right away.
    ///
    /// Only valid from `Idle`; while running or paused this does nothing and
    /// returns `None`. Must be called from within a tokio runtime.
    pub fn start<O>(&mut self, settings: RunSettings, observer: O) -> Option<Event>
    where
        O: RunObserver + Send + 'static,
    {
        if self.state != ClickerState::Idle {
            tracing::debug!(state = ?self.state, "start ignored, run already active");
            return None;
        }

        tracing::info!(
            button = %settings.click.button,
            click_type = ?settings.click.click_type,
            interval_ms = settings.click.interval_ms,
            repeat_count = settings.click.repeat_count,
            target = ?settings.position.target(),
            "starting click run"
        );

        let event = Event::ClickerStarted {
            click: settings.click.clone(),
            target: settings.position.target(),
            at: Utc::now(),
        };

        let mut observer: Box<dyn RunObserver + Send> = Box::new(observer);
        observer.on_started(&settings);

        self.click_count = 0;
        self.state = ClickerState::Running;
        self.run = Some(ActiveRun {
            timer: RepeatingTimer::arm(settings.click.interval()),
            settings,
            observer,
        });

        self.fire();
        Some(event)
    }

    pub fn pause(&mut self) -> Option<Event> {
        match self.state {
            ClickerState::Running => {
                self.state = ClickerState::Paused;
                tracing::info!(click_count = self.click_count, "click run paused");
                Some(Event::ClickerPaused {
                    click_count: self.click_count,
                    at: Utc::now(),
                })
            }
            _ => {
                tracing::debug!(state = ?self.state, "pause ignored");
                None
            }
        }
    }

    pub fn resume(&mut self) -> Option<Event> {
        match self.state {
            ClickerState::Paused => {
                self.state = ClickerState::Running;
                tracing::info!(click_count = self.click_count, "click run resumed");
                Some(Event::ClickerResumed {
                    click_count: self.click_count,
                    at: Utc::now(),
                })
            }
            _ => {
                tracing::debug!(state = ?self.state, "resume ignored");
                None
            }
        }
    }

    /// Cancel the timer and return to `Idle`. The click count is kept until
    /// the next start. Safe to call when already idle.
    pub fn stop(&mut self) -> Option<Event> {
        match self.state {
            ClickerState::Idle => None,
            ClickerState::Running | ClickerState::Paused => {
                drop(self.teardown());
                tracing::info!(click_count = self.click_count, "click run stopped");
                Some(Event::ClickerStopped {
                    click_count: self.click_count,
                    at: Utc::now(),
                })
            }
        }
    }

    /// Handle one timer firing. Clicks only while `Running`.
    ///
    /// Returns `Clicked`, or `RunCompleted` when this click reached the
    /// repeat count. The same information already went to the observer.
    pub fn tick(&mut self) -> Option<Event> {
        match self.state {
            ClickerState::Running => {
                let completed = self.fire();
                Some(if completed {
                    Event::RunCompleted {
                        total: self.click_count,
                        at: Utc::now(),
                    }
                } else {
                    Event::Clicked {
                        count: self.click_count,
                        at: Utc::now(),
                    }
                })
            }
            ClickerState::Paused | ClickerState::Idle => None,
        }
    }

    /// Wait for the active timer to fire. Never resolves while idle.
    pub async fn next_tick(&mut self) {
        match self.run.as_mut() {
            Some(run) => {
                run.timer.tick().await;
            }
            None => future::pending::<()>().await,
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Click once, count it, report it. Returns true if the run completed.
    fn fire(&mut self) -> bool {
        let Some(run) = self.run.as_mut() else {
            return false;
        };

        perform_click(&mut self.input, &run.settings);
        self.click_count += 1;
        tracing::debug!(count = self.click_count, "click performed");
        run.observer.on_progress(self.click_count);

        let limit = run.settings.click.repeat_count;
        if limit == 0 || self.click_count < limit {
            return false;
        }

        if let Some(ActiveRun {
            mut observer,
            timer,
            ..
        }) = self.teardown()
        {
            drop(timer);
            tracing::info!(total = self.click_count, "repeat count reached, run complete");
            observer.on_complete(self.run_state());
        }
        true
    }

    fn teardown(&mut self) -> Option<ActiveRun> {
        self.state = ClickerState::Idle;
        self.run.take()
    }
}

/// Dispatch one click: optional move, then one or two down/up pairs.
///
/// Native failures are logged and swallowed so a single bad injection never
/// aborts a run.
pub fn perform_click<P: InputPort + ?Sized>(input: &mut P, settings: &RunSettings) {
    if let Some(target) = settings.position.target() {
        if let Err(e) = input.set_pointer_position(target) {
            tracing::warn!(error = %e, %target, "failed to move pointer");
        }
    }

    let button = settings.click.button;
    for _ in 0..settings.click.click_type.presses() {
        for phase in [ButtonPhase::Down, ButtonPhase::Up] {
            if let Err(e) = input.inject_button(button, phase) {
                tracing::warn!(error = %e, "button injection failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InputError;
    use crate::input::ButtonEvent;
    use crate::notifier::observer_fn;
    use crate::settings::{ClickSettings, ClickType, MouseButton, PositionSettings};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::time::Instant;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Move(Point),
        Button(ButtonEvent),
    }

    #[derive(Debug, Default)]
    struct RecordingInput {
        calls: Vec<Call>,
        pointer: Point,
        fail_injection: bool,
        fail_query: bool,
        fail_move: bool,
    }

    impl RecordingInput {
        fn button_events(&self) -> usize {
            self.calls
                .iter()
                .filter(|c| matches!(c, Call::Button(_)))
                .count()
        }
    }

    impl InputPort for RecordingInput {
        fn pointer_position(&mut self) -> Result<Point, InputError> {
            if self.fail_query {
                return Err(InputError::Query {
                    operation: "query",
                    message: "access denied".into(),
                });
            }
            Ok(self.pointer)
        }

        fn set_pointer_position(&mut self, point: Point) -> Result<(), InputError> {
            self.calls.push(Call::Move(point));
            if self.fail_move {
                return Err(InputError::Query {
                    operation: "move",
                    message: "access denied".into(),
                });
            }
            self.pointer = point;
            Ok(())
        }

        fn inject_button(
            &mut self,
            button: MouseButton,
            phase: ButtonPhase,
        ) -> Result<(), InputError> {
            self.calls.push(Call::Button(ButtonEvent::new(button, phase)));
            if self.fail_injection {
                return Err(InputError::Injection {
                    button,
                    phase,
                    message: "blocked".into(),
                });
            }
            Ok(())
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Note {
        Progress(u64),
        Complete(RunState),
    }

    type Log = Arc<Mutex<Vec<Note>>>;

    fn recorder() -> (Log, impl RunObserver + Send + 'static) {
        let log: Log = Arc::default();
        let progress = Arc::clone(&log);
        let complete = Arc::clone(&log);
        let observer = observer_fn(
            move |n| progress.lock().unwrap().push(Note::Progress(n)),
            move |s| complete.lock().unwrap().push(Note::Complete(s)),
        );
        (log, observer)
    }

    fn settings(interval_ms: u64, repeat_count: u64) -> RunSettings {
        RunSettings {
            click: ClickSettings {
                interval_ms,
                repeat_count,
                ..Default::default()
            },
            position: PositionSettings::default(),
        }
    }

    /// Let up to `ticks` timer firings through, stopping early once idle.
    async fn drive<P: InputPort>(scheduler: &mut ClickScheduler<P>, ticks: usize) -> Vec<Instant> {
        let mut fired_at = Vec::new();
        for _ in 0..ticks {
            if !scheduler.is_armed() {
                break;
            }
            scheduler.next_tick().await;
            fired_at.push(Instant::now());
            scheduler.tick();
        }
        fired_at
    }

    #[tokio::test(start_paused = true)]
    async fn three_clicks_then_completes() {
        let mut scheduler = ClickScheduler::new(RecordingInput::default());
        let (log, observer) = recorder();
        let started_at = Instant::now();

        assert!(scheduler.start(settings(50, 3), observer).is_some());
        assert_eq!(scheduler.click_count(), 1);
        assert_eq!(*log.lock().unwrap(), vec![Note::Progress(1)]);

        let fired_at = drive(&mut scheduler, 10).await;

        assert_eq!(
            fired_at,
            vec![
                started_at + Duration::from_millis(50),
                started_at + Duration::from_millis(100)
            ]
        );
        let idle = RunState {
            is_running: false,
            is_paused: false,
            click_count: 3,
        };
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                Note::Progress(1),
                Note::Progress(2),
                Note::Progress(3),
                Note::Complete(idle),
            ]
        );
        assert_eq!(scheduler.run_state(), idle);
        assert!(!scheduler.is_armed());
        assert_eq!(scheduler.input().button_events(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn unbounded_run_keeps_going() {
        let mut scheduler = ClickScheduler::new(RecordingInput::default());
        let (log, observer) = recorder();

        scheduler.start(settings(10, 0), observer);
        drive(&mut scheduler, 25).await;

        assert_eq!(scheduler.state(), ClickerState::Running);
        assert_eq!(scheduler.click_count(), 26);
        assert!(!log
            .lock()
            .unwrap()
            .iter()
            .any(|n| matches!(n, Note::Complete(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn paused_ticks_do_not_click() {
        let mut scheduler = ClickScheduler::new(RecordingInput::default());
        let (log, observer) = recorder();

        scheduler.start(settings(20, 0), observer);
        assert!(scheduler.pause().is_some());

        let fired = drive(&mut scheduler, 5).await;
        assert_eq!(fired.len(), 5, "timer keeps firing while paused");
        assert_eq!(scheduler.click_count(), 1);
        assert_eq!(log.lock().unwrap().len(), 1);
        assert!(scheduler.is_armed());

        assert!(scheduler.resume().is_some());
        drive(&mut scheduler, 2).await;
        assert_eq!(scheduler.click_count(), 3);
        assert_eq!(
            *log.lock().unwrap(),
            vec![Note::Progress(1), Note::Progress(2), Note::Progress(3)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn paused_run_does_not_complete() {
        let mut scheduler = ClickScheduler::new(RecordingInput::default());
        let (log, observer) = recorder();

        scheduler.start(settings(10, 2), observer);
        scheduler.pause();
        drive(&mut scheduler, 4).await;

        assert_eq!(scheduler.state(), ClickerState::Paused);
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent() {
        let mut scheduler = ClickScheduler::new(RecordingInput::default());
        let (log, observer) = recorder();

        scheduler.start(settings(10, 0), observer);
        drive(&mut scheduler, 2).await;

        assert!(scheduler.stop().is_some());
        let after_first = scheduler.run_state();
        assert!(scheduler.stop().is_none());
        assert_eq!(scheduler.run_state(), after_first);
        assert_eq!(after_first.click_count, 3);
        assert!(!after_first.is_running);
        assert!(!scheduler.is_armed());
        assert!(
            !log.lock()
                .unwrap()
                .iter()
                .any(|n| matches!(n, Note::Complete(_))),
            "manual stop never reports completion"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_pending_tick() {
        let mut scheduler = ClickScheduler::new(RecordingInput::default());
        let (_log, observer) = recorder();

        scheduler.start(settings(10, 0), observer);
        scheduler.stop();

        let waited = tokio::time::timeout(Duration::from_secs(1), scheduler.next_tick()).await;
        assert!(waited.is_err(), "no tick after stop");
        assert!(scheduler.tick().is_none());
        assert_eq!(scheduler.click_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn start_while_running_is_noop() {
        let mut scheduler = ClickScheduler::new(RecordingInput::default());
        let (_log, observer) = recorder();
        let (second_log, second) = recorder();

        scheduler.start(settings(10, 0), observer);
        drive(&mut scheduler, 2).await;
        scheduler.pause();

        assert!(scheduler.start(settings(500, 1), second).is_none());
        assert_eq!(scheduler.click_count(), 3);
        assert!(scheduler.is_paused());
        assert_eq!(scheduler.settings().unwrap().click.interval_ms, 10);
        assert!(second_log.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn double_click_counts_once_per_tick() {
        let mut scheduler = ClickScheduler::new(RecordingInput::default());
        let (log, observer) = recorder();
        let mut double = settings(10, 0);
        double.click.click_type = ClickType::Double;
        double.click.button = MouseButton::Right;

        scheduler.start(double, observer);
        drive(&mut scheduler, 2).await;

        assert_eq!(scheduler.click_count(), 3);
        assert_eq!(log.lock().unwrap().len(), 3);
        let expected: Vec<Call> = std::iter::repeat([
            Call::Button(ButtonEvent::RightDown),
            Call::Button(ButtonEvent::RightUp),
        ])
        .take(6)
        .flatten()
        .collect();
        assert_eq!(scheduler.input().calls, expected);
    }

    #[tokio::test(start_paused = true)]
    async fn fixed_point_moves_before_each_click() {
        let mut scheduler = ClickScheduler::new(RecordingInput::default());
        let (_log, observer) = recorder();
        let mut fixed = settings(10, 2);
        fixed.position = PositionSettings::fixed(500, 300);
        fixed.click.click_type = ClickType::Double;

        scheduler.start(fixed, observer);
        drive(&mut scheduler, 5).await;

        let target = Call::Move(Point::new(500, 300));
        let one_click = [
            target,
            Call::Button(ButtonEvent::LeftDown),
            Call::Button(ButtonEvent::LeftUp),
            Call::Button(ButtonEvent::LeftDown),
            Call::Button(ButtonEvent::LeftUp),
        ];
        let expected: Vec<Call> = one_click.iter().chain(one_click.iter()).copied().collect();
        assert_eq!(scheduler.input().calls, expected);
    }

    #[tokio::test(start_paused = true)]
    async fn follow_cursor_never_moves_pointer() {
        let mut scheduler = ClickScheduler::new(RecordingInput::default());
        let (_log, observer) = recorder();

        scheduler.start(settings(10, 3), observer);
        drive(&mut scheduler, 5).await;

        assert!(!scheduler
            .input()
            .calls
            .iter()
            .any(|c| matches!(c, Call::Move(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn pause_and_resume_from_idle_are_ignored() {
        let mut scheduler = ClickScheduler::new(RecordingInput::default());

        assert!(scheduler.pause().is_none());
        assert!(scheduler.resume().is_none());
        assert_eq!(scheduler.run_state(), RunState::default());
        assert!(!scheduler.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn resume_while_running_is_ignored() {
        let mut scheduler = ClickScheduler::new(RecordingInput::default());
        let (_log, observer) = recorder();

        scheduler.start(settings(10, 0), observer);
        assert!(scheduler.resume().is_none());
        assert_eq!(scheduler.state(), ClickerState::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn injection_failures_do_not_stop_the_run() {
        let input = RecordingInput {
            fail_injection: true,
            ..Default::default()
        };
        let mut scheduler = ClickScheduler::new(input);
        let (log, observer) = recorder();

        scheduler.start(settings(10, 0), observer);
        drive(&mut scheduler, 5).await;

        assert_eq!(scheduler.state(), ClickerState::Running);
        assert!(scheduler.is_armed());
        assert_eq!(scheduler.click_count(), 6);
        assert_eq!(log.lock().unwrap().len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_move_still_clicks_and_counts() {
        let input = RecordingInput {
            fail_move: true,
            ..Default::default()
        };
        let mut scheduler = ClickScheduler::new(input);
        let (log, observer) = recorder();
        let mut fixed = settings(10, 3);
        fixed.position = PositionSettings::fixed(500, 300);

        scheduler.start(fixed, observer);
        drive(&mut scheduler, 5).await;

        assert_eq!(scheduler.click_count(), 3);
        assert_eq!(scheduler.state(), ClickerState::Idle);
        assert_eq!(log.lock().unwrap().len(), 4, "three clicks and completion");

        let one_click = [
            Call::Move(Point::new(500, 300)),
            Call::Button(ButtonEvent::LeftDown),
            Call::Button(ButtonEvent::LeftUp),
        ];
        let expected: Vec<Call> = one_click.iter().cycle().take(9).copied().collect();
        assert_eq!(scheduler.input().calls, expected);
        assert_eq!(scheduler.input().pointer, Point::default());
    }

    #[tokio::test(start_paused = true)]
    async fn single_click_run_completes_inside_start() {
        let mut scheduler = ClickScheduler::new(RecordingInput::default());
        let (log, observer) = recorder();

        assert!(scheduler.start(settings(10, 1), observer).is_some());

        assert_eq!(scheduler.state(), ClickerState::Idle);
        assert!(!scheduler.is_armed());
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                Note::Progress(1),
                Note::Complete(RunState {
                    is_running: false,
                    is_paused: false,
                    click_count: 1,
                })
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn new_run_resets_click_count() {
        let mut scheduler = ClickScheduler::new(RecordingInput::default());
        let (_log, observer) = recorder();
        scheduler.start(settings(10, 2), observer);
        drive(&mut scheduler, 3).await;
        assert_eq!(scheduler.click_count(), 2);
        assert_eq!(scheduler.state(), ClickerState::Idle);

        let (log, observer) = recorder();
        scheduler.start(settings(10, 0), observer);
        assert_eq!(scheduler.click_count(), 1);
        assert_eq!(*log.lock().unwrap(), vec![Note::Progress(1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn pointer_query_falls_back_to_last_known() {
        let input = RecordingInput {
            pointer: Point::new(40, 60),
            ..Default::default()
        };
        let mut scheduler = ClickScheduler::new(input);

        assert_eq!(scheduler.pointer_position(), Point::new(40, 60));
        scheduler.input_mut().fail_query = true;
        scheduler.input_mut().pointer = Point::new(1, 1);
        assert_eq!(scheduler.pointer_position(), Point::new(40, 60));
    }

    #[test]
    fn run_state_maps_to_clicker_state() {
        let paused = RunState {
            is_running: true,
            is_paused: true,
            click_count: 4,
        };
        assert_eq!(paused.state(), ClickerState::Paused);
        assert_eq!(paused.summary(), "Paused (4 clicks)");
        assert_eq!(RunState::default().state(), ClickerState::Idle);
    }
}

//! Progress and completion callbacks for a run.

use chrono::Utc;
use tokio::sync::mpsc::UnboundedSender;

use crate::events::Event;
use crate::scheduler::RunState;
use crate::settings::RunSettings;

/// Receives per-click progress and run completion from the scheduler.
///
/// Both methods are called synchronously on the context that performed the
/// click. `on_complete` is only called when the repeat count was reached,
/// never on a manual stop, and sees the scheduler already idle.
pub trait RunObserver {
    /// Called once when a run begins, before its first click.
    fn on_started(&mut self, _settings: &RunSettings) {}

    fn on_progress(&mut self, count: u64);
    fn on_complete(&mut self, final_state: RunState);
}

/// Observer built from two closures. See [`observer_fn`].
pub struct FnObserver<P, C> {
    on_progress: P,
    on_complete: C,
}

/// Build an observer from a progress closure and a completion closure.
pub fn observer_fn<P, C>(on_progress: P, on_complete: C) -> FnObserver<P, C>
where
    P: FnMut(u64),
    C: FnMut(RunState),
{
    FnObserver {
        on_progress,
        on_complete,
    }
}

impl<P, C> RunObserver for FnObserver<P, C>
where
    P: FnMut(u64),
    C: FnMut(RunState),
{
    fn on_progress(&mut self, count: u64) {
        (self.on_progress)(count)
    }

    fn on_complete(&mut self, final_state: RunState) {
        (self.on_complete)(final_state)
    }
}

/// Forwards progress and completion into an event channel.
///
/// A closed channel is not an error for the run: the host may have gone away
/// while the clicker keeps going until it is stopped.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    events: UnboundedSender<Event>,
}

impl ChannelObserver {
    pub fn new(events: UnboundedSender<Event>) -> Self {
        Self { events }
    }

    fn send(&self, event: Event) {
        if self.events.send(event).is_err() {
            tracing::debug!("event receiver dropped");
        }
    }
}

impl RunObserver for ChannelObserver {
    fn on_started(&mut self, settings: &RunSettings) {
        self.send(Event::ClickerStarted {
            click: settings.click.clone(),
            target: settings.position.target(),
            at: Utc::now(),
        });
    }

    fn on_progress(&mut self, count: u64) {
        self.send(Event::Clicked {
            count,
            at: Utc::now(),
        });
    }

    fn on_complete(&mut self, final_state: RunState) {
        self.send(Event::RunCompleted {
            total: final_state.click_count,
            at: Utc::now(),
        });
    }
}

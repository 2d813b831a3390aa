//! Control surface adapter.
//!
//! Turns requests from the host (tray menu, hotkeys, settings window, stdin)
//! into scheduler calls and pushes the resulting events to the host. Holds no
//! state of its own beyond what it forwards.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tokio::sync::mpsc::UnboundedSender;

use crate::error::CoreError;
use crate::events::Event;
use crate::input::InputPort;
use crate::notifier::ChannelObserver;
use crate::scheduler::{ClickScheduler, ClickerState, RunState};
use crate::settings::{HotkeySettings, Point};
use crate::storage::SettingsSource;

/// A request from the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ControlRequest {
    Start,
    Stop,
    /// Stop if running, start otherwise.
    Toggle,
    Pause,
    Resume,
    /// Pause if running, resume if paused, ignored when idle.
    TogglePause,
    /// Report the pointer position.
    Position,
    /// Report the current run state.
    Status,
    /// A global hotkey fired.
    Hotkey { key: String },
    Shutdown,
}

impl FromStr for ControlRequest {
    type Err = CoreError;

    /// Parses either a JSON object (`{"command": "toggle"}`) or a plain line
    /// such as `toggle`, `pause-toggle` or `hotkey F6`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        if line.starts_with('{') {
            return Ok(serde_json::from_str(line)?);
        }

        let mut words = line.split_whitespace();
        let verb = words
            .next()
            .ok_or_else(|| CoreError::InvalidRequest("empty request".into()))?
            .to_ascii_lowercase();
        let request = match verb.as_str() {
            "start" => ControlRequest::Start,
            "stop" => ControlRequest::Stop,
            "toggle" => ControlRequest::Toggle,
            "pause" => ControlRequest::Pause,
            "resume" => ControlRequest::Resume,
            "toggle_pause" | "toggle-pause" | "pause-toggle" => ControlRequest::TogglePause,
            "position" | "pos" => ControlRequest::Position,
            "status" => ControlRequest::Status,
            "hotkey" => {
                let key = words
                    .next()
                    .ok_or_else(|| CoreError::InvalidRequest("hotkey needs a key name".into()))?;
                ControlRequest::Hotkey {
                    key: key.to_string(),
                }
            }
            "shutdown" | "quit" | "exit" => ControlRequest::Shutdown,
            other => return Err(CoreError::InvalidRequest(format!("unknown command '{other}'"))),
        };
        Ok(request)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    Toggle,
    TogglePause,
}

/// Map a triggered key name to its action. Matching is case-insensitive.
pub fn hotkey_action(hotkeys: &HotkeySettings, key: &str) -> Option<HotkeyAction> {
    let key = key.trim();
    if key.eq_ignore_ascii_case(&hotkeys.toggle) {
        Some(HotkeyAction::Toggle)
    } else if !hotkeys.pause.is_empty() && key.eq_ignore_ascii_case(&hotkeys.pause) {
        Some(HotkeyAction::TogglePause)
    } else {
        None
    }
}

/// Whether the host should keep feeding requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Shutdown,
}

pub struct ControlSurface<P, S> {
    scheduler: ClickScheduler<P>,
    settings: S,
    hotkeys: HotkeySettings,
    events: UnboundedSender<Event>,
}

impl<P: InputPort, S: SettingsSource> ControlSurface<P, S> {
    pub fn new(
        scheduler: ClickScheduler<P>,
        settings: S,
        hotkeys: HotkeySettings,
        events: UnboundedSender<Event>,
    ) -> Self {
        Self {
            scheduler,
            settings,
            hotkeys,
            events,
        }
    }

    pub fn scheduler(&self) -> &ClickScheduler<P> {
        &self.scheduler
    }

    pub fn run_state(&self) -> RunState {
        self.scheduler.run_state()
    }

    pub fn handle(&mut self, request: ControlRequest) -> Flow {
        tracing::debug!(?request, "control request");
        match request {
            ControlRequest::Start => {
                self.start();
            }
            ControlRequest::Stop => {
                self.stop();
            }
            ControlRequest::Toggle => {
                self.toggle();
            }
            ControlRequest::Pause => {
                self.pause();
            }
            ControlRequest::Resume => {
                self.resume();
            }
            ControlRequest::TogglePause => {
                self.toggle_pause();
            }
            ControlRequest::Position => {
                self.pointer_position();
            }
            ControlRequest::Status => self.emit_state(),
            ControlRequest::Hotkey { key } => {
                self.hotkey(&key);
            }
            ControlRequest::Shutdown => return Flow::Shutdown,
        }
        Flow::Continue
    }

    /// Start a run with a fresh settings snapshot. Returns false if one was
    /// already active.
    pub fn start(&mut self) -> bool {
        let settings = self.settings.snapshot();
        let observer = ChannelObserver::new(self.events.clone());
        let started = self.scheduler.start(settings, observer).is_some();
        if started {
            self.emit_state();
        }
        started
    }

    pub fn stop(&mut self) -> bool {
        let event = self.scheduler.stop();
        self.forward(event)
    }

    pub fn toggle(&mut self) -> bool {
        if self.scheduler.is_running() {
            self.stop()
        } else {
            self.start()
        }
    }

    pub fn pause(&mut self) -> bool {
        let event = self.scheduler.pause();
        self.forward(event)
    }

    pub fn resume(&mut self) -> bool {
        let event = self.scheduler.resume();
        self.forward(event)
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.scheduler.state() {
            ClickerState::Running => self.pause(),
            ClickerState::Paused => self.resume(),
            ClickerState::Idle => {
                tracing::debug!("pause toggle ignored while idle");
                false
            }
        }
    }

    pub fn hotkey(&mut self, key: &str) -> bool {
        match hotkey_action(&self.hotkeys, key) {
            Some(HotkeyAction::Toggle) => self.toggle(),
            Some(HotkeyAction::TogglePause) => self.toggle_pause(),
            None => {
                tracing::warn!(key, "no action bound to hotkey");
                false
            }
        }
    }

    pub fn pointer_position(&mut self) -> Point {
        let point = self.scheduler.pointer_position();
        self.emit(Event::PointerPosition {
            x: point.x,
            y: point.y,
            at: Utc::now(),
        });
        point
    }

    /// Handle one timer firing. Progress already reaches the host through
    /// the run's observer; this adds the state broadcast.
    pub fn tick(&mut self) {
        if self.scheduler.tick().is_some() {
            self.emit_state();
        }
    }

    pub async fn next_tick(&mut self) {
        self.scheduler.next_tick().await
    }

    fn forward(&mut self, event: Option<Event>) -> bool {
        match event {
            Some(event) => {
                self.emit(event);
                self.emit_state();
                true
            }
            None => false,
        }
    }

    fn emit_state(&self) {
        self.emit(self.scheduler.snapshot());
    }

    fn emit(&self, event: Event) {
        if self.events.send(event).is_err() {
            tracing::debug!("event receiver dropped");
        }
    }
}

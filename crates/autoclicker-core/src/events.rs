use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scheduler::RunState;
use crate::settings::{ClickSettings, Point};

/// Every state change in the clicker produces an Event.
/// The host forwards them to whatever UI or tray surface it drives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    ClickerStarted {
        click: ClickSettings,
        /// Fixed target, or `None` when following the cursor.
        target: Option<Point>,
        at: DateTime<Utc>,
    },
    /// One click was dispatched. `count` is the run's click count after it.
    Clicked {
        count: u64,
        at: DateTime<Utc>,
    },
    /// The repeat count was reached and the run stopped itself.
    RunCompleted {
        total: u64,
        at: DateTime<Utc>,
    },
    ClickerPaused {
        click_count: u64,
        at: DateTime<Utc>,
    },
    ClickerResumed {
        click_count: u64,
        at: DateTime<Utc>,
    },
    /// The run was stopped by request.
    ClickerStopped {
        click_count: u64,
        at: DateTime<Utc>,
    },
    StateChanged {
        state: RunState,
        at: DateTime<Utc>,
    },
    PointerPosition {
        x: i32,
        y: i32,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::ClickerStarted { .. } => "ClickerStarted",
            Event::Clicked { .. } => "Clicked",
            Event::RunCompleted { .. } => "RunCompleted",
            Event::ClickerPaused { .. } => "ClickerPaused",
            Event::ClickerResumed { .. } => "ClickerResumed",
            Event::ClickerStopped { .. } => "ClickerStopped",
            Event::StateChanged { .. } => "StateChanged",
            Event::PointerPosition { .. } => "PointerPosition",
        }
    }
}

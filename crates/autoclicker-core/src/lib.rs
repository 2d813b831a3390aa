//! # Auto Clicker Core Library
//!
//! This library provides the core logic for a desktop auto clicker: a
//! background process that clicks at a configurable interval, button,
//! position and repeat count. Tray, hotkey registration and the settings
//! window live in the host; the host talks to this crate through
//! [`ControlRequest`]s and receives [`Event`]s.
//!
//! ## Architecture
//!
//! - **Click Scheduler**: the run/pause/stop state machine. Owns the
//!   repeating timer, counts clicks and detects completion
//! - **Input Port**: the pointer and button capability the scheduler drives,
//!   with a Win32 binding and a dry-run port
//! - **Storage**: TOML-based configuration, validated before it reaches a run
//! - **Control Surface / Service**: request handling and the single-task
//!   event loop that serialises requests and timer ticks
//!
//! ## Key Components
//!
//! - [`ClickScheduler`]: Core click state machine
//! - [`InputPort`]: Native pointer control contract
//! - [`Config`]: Application configuration management
//! - [`ClickerService`]: Event loop for a host process

pub mod control;
pub mod error;
pub mod events;
pub mod input;
pub mod notifier;
pub mod scheduler;
pub mod service;
pub mod settings;
pub mod storage;
pub mod timer;

pub use control::{hotkey_action, ControlRequest, ControlSurface, Flow, HotkeyAction};
pub use error::{ConfigError, CoreError, InputError};
pub use events::Event;
pub use input::{ButtonEvent, ButtonPhase, DryRunInput, InputPort};
pub use notifier::{observer_fn, ChannelObserver, FnObserver, RunObserver};
pub use scheduler::{perform_click, ClickScheduler, ClickerState, RunState};
pub use service::ClickerService;
pub use settings::{
    ClickSettings, ClickType, HotkeySettings, MouseButton, Point, PositionMode, PositionSettings,
    RunSettings,
};
pub use storage::{Config, ConfigFile, LoggingConfig, SettingsSource};
pub use timer::RepeatingTimer;

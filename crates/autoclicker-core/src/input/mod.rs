//! Native input port.
//!
//! The scheduler talks to the operating system only through [`InputPort`]:
//! read the pointer, move the pointer, inject one button transition. Every
//! method returns a `Result` so the caller decides what a failure means; the
//! scheduler logs and continues.

mod dry_run;
#[cfg(windows)]
mod win32;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use dry_run::DryRunInput;
#[cfg(windows)]
pub use win32::WindowsInput;

use crate::error::InputError;
use crate::settings::{MouseButton, Point};

/// The down or up half of a single button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonPhase {
    Down,
    Up,
}

impl fmt::Display for ButtonPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ButtonPhase::Down => "down",
            ButtonPhase::Up => "up",
        })
    }
}

/// One concrete button transition as the OS sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonEvent {
    LeftDown,
    LeftUp,
    RightDown,
    RightUp,
    MiddleDown,
    MiddleUp,
}

impl ButtonEvent {
    pub fn new(button: MouseButton, phase: ButtonPhase) -> Self {
        let (down, up) = button.events();
        match phase {
            ButtonPhase::Down => down,
            ButtonPhase::Up => up,
        }
    }
}

impl MouseButton {
    /// The (down, up) event pair for this button.
    pub fn events(self) -> (ButtonEvent, ButtonEvent) {
        match self {
            MouseButton::Left => (ButtonEvent::LeftDown, ButtonEvent::LeftUp),
            MouseButton::Right => (ButtonEvent::RightDown, ButtonEvent::RightUp),
            MouseButton::Middle => (ButtonEvent::MiddleDown, ButtonEvent::MiddleUp),
        }
    }
}

/// Pointer control capability provided by the host OS.
pub trait InputPort {
    /// Current pointer coordinates.
    fn pointer_position(&mut self) -> Result<Point, InputError>;

    /// Move the pointer. Best effort: the OS may clamp to screen bounds.
    fn set_pointer_position(&mut self, point: Point) -> Result<(), InputError>;

    /// Inject a single button transition at the current pointer position.
    fn inject_button(&mut self, button: MouseButton, phase: ButtonPhase) -> Result<(), InputError>;
}

impl<T: InputPort + ?Sized> InputPort for Box<T> {
    fn pointer_position(&mut self) -> Result<Point, InputError> {
        (**self).pointer_position()
    }

    fn set_pointer_position(&mut self, point: Point) -> Result<(), InputError> {
        (**self).set_pointer_position(point)
    }

    fn inject_button(&mut self, button: MouseButton, phase: ButtonPhase) -> Result<(), InputError> {
        (**self).inject_button(button, phase)
    }
}

/// The native binding for this platform.
#[cfg(windows)]
pub fn native() -> Result<Box<dyn InputPort + Send>, InputError> {
    Ok(Box::new(WindowsInput::new()))
}

/// The native binding for this platform.
#[cfg(not(windows))]
pub fn native() -> Result<Box<dyn InputPort + Send>, InputError> {
    Err(InputError::Unsupported(std::env::consts::OS))
}

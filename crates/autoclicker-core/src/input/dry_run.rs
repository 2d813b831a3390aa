use crate::error::InputError;
use crate::settings::{MouseButton, Point};

use super::{ButtonEvent, ButtonPhase, InputPort};

/// Input port that never touches the OS.
///
/// Keeps a virtual pointer so position queries stay consistent, and logs
/// every request at debug level. Used for `--dry-run` and on platforms with
/// no native binding.
#[derive(Debug, Default)]
pub struct DryRunInput {
    pointer: Point,
    injected: u64,
}

impl DryRunInput {
    pub fn at(pointer: Point) -> Self {
        Self {
            pointer,
            injected: 0,
        }
    }

    /// Number of button transitions accepted so far.
    pub fn injected(&self) -> u64 {
        self.injected
    }
}

impl InputPort for DryRunInput {
    fn pointer_position(&mut self) -> Result<Point, InputError> {
        Ok(self.pointer)
    }

    fn set_pointer_position(&mut self, point: Point) -> Result<(), InputError> {
        tracing::debug!(%point, "dry-run: move pointer");
        self.pointer = point;
        Ok(())
    }

    fn inject_button(&mut self, button: MouseButton, phase: ButtonPhase) -> Result<(), InputError> {
        let event = ButtonEvent::new(button, phase);
        tracing::debug!(?event, pointer = %self.pointer, "dry-run: button event");
        self.injected += 1;
        Ok(())
    }
}

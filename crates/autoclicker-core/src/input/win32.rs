//! Win32 binding for the input port.

use windows::Win32::Foundation::POINT;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_MOUSE, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP,
    MOUSEEVENTF_MIDDLEDOWN, MOUSEEVENTF_MIDDLEUP, MOUSEEVENTF_RIGHTDOWN, MOUSEEVENTF_RIGHTUP,
    MOUSEINPUT, MOUSE_EVENT_FLAGS,
};
use windows::Win32::UI::WindowsAndMessaging::{GetCursorPos, SetCursorPos};

use crate::error::InputError;
use crate::settings::{MouseButton, Point};

use super::{ButtonEvent, ButtonPhase, InputPort};

/// Tags injected events so hooks can tell them apart from real input.
const INJECT_TAG: usize = 0x4143_4C4B; // "ACLK"

#[derive(Debug, Default)]
pub struct WindowsInput;

impl WindowsInput {
    pub fn new() -> Self {
        Self
    }
}

fn event_flags(event: ButtonEvent) -> MOUSE_EVENT_FLAGS {
    match event {
        ButtonEvent::LeftDown => MOUSEEVENTF_LEFTDOWN,
        ButtonEvent::LeftUp => MOUSEEVENTF_LEFTUP,
        ButtonEvent::RightDown => MOUSEEVENTF_RIGHTDOWN,
        ButtonEvent::RightUp => MOUSEEVENTF_RIGHTUP,
        ButtonEvent::MiddleDown => MOUSEEVENTF_MIDDLEDOWN,
        ButtonEvent::MiddleUp => MOUSEEVENTF_MIDDLEUP,
    }
}

impl InputPort for WindowsInput {
    fn pointer_position(&mut self) -> Result<Point, InputError> {
        let mut point = POINT { x: 0, y: 0 };
        unsafe { GetCursorPos(&mut point) }.map_err(|e| InputError::Query {
            operation: "query",
            message: e.to_string(),
        })?;
        Ok(Point::new(point.x, point.y))
    }

    fn set_pointer_position(&mut self, point: Point) -> Result<(), InputError> {
        unsafe { SetCursorPos(point.x, point.y) }.map_err(|e| InputError::Query {
            operation: "move",
            message: e.to_string(),
        })
    }

    fn inject_button(&mut self, button: MouseButton, phase: ButtonPhase) -> Result<(), InputError> {
        let input = INPUT {
            r#type: INPUT_MOUSE,
            Anonymous: INPUT_0 {
                mi: MOUSEINPUT {
                    dx: 0,
                    dy: 0,
                    mouseData: 0,
                    dwFlags: event_flags(ButtonEvent::new(button, phase)),
                    time: 0,
                    dwExtraInfo: INJECT_TAG,
                },
            },
        };

        let sent = unsafe { SendInput(&[input], std::mem::size_of::<INPUT>() as i32) };
        if sent == 0 {
            return Err(InputError::Injection {
                button,
                phase,
                message: windows::core::Error::from_win32().to_string(),
            });
        }
        Ok(())
    }
}

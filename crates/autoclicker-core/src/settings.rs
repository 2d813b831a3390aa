//! Click and position settings.
//!
//! These are the values a run is configured with. The settings store hands the
//! scheduler a [`RunSettings`] snapshot that has already been through
//! [`RunSettings::validated`]; the scheduler never re-checks ranges.
//!
//! Enum values are parsed leniently when deserialized: an unknown button name
//! becomes `left`, anything but `double` becomes `single`, and anything but
//! `fixed` becomes `current`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Shortest allowed interval between clicks.
pub const MIN_INTERVAL_MS: u64 = 10;
/// Longest allowed interval between clicks.
pub const MAX_INTERVAL_MS: u64 = 60_000;
/// Interval used when none (or zero) is configured.
pub const DEFAULT_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn as_str(self) -> &'static str {
        match self {
            MouseButton::Left => "left",
            MouseButton::Right => "right",
            MouseButton::Middle => "middle",
        }
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MouseButton {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(MouseButton::Left),
            "right" => Ok(MouseButton::Right),
            "middle" => Ok(MouseButton::Middle),
            other => Err(ConfigError::InvalidValue {
                key: "click.button".into(),
                message: format!("unknown button '{other}' (expected left, right or middle)"),
            }),
        }
    }
}

impl From<String> for MouseButton {
    fn from(raw: String) -> Self {
        lenient(&raw)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ClickType {
    #[default]
    Single,
    Double,
}

impl ClickType {
    /// Number of full down/up cycles that make up one click.
    pub fn presses(self) -> usize {
        match self {
            ClickType::Single => 1,
            ClickType::Double => 2,
        }
    }
}

impl FromStr for ClickType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(ClickType::Single),
            "double" => Ok(ClickType::Double),
            other => Err(ConfigError::InvalidValue {
                key: "click.click_type".into(),
                message: format!("unknown click type '{other}' (expected single or double)"),
            }),
        }
    }
}

impl From<String> for ClickType {
    fn from(raw: String) -> Self {
        lenient(&raw)
    }
}

/// Where a click lands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum PositionMode {
    /// Click wherever the pointer currently is.
    #[default]
    #[serde(rename = "current")]
    FollowCursor,
    /// Move the pointer to a fixed coordinate before every click.
    #[serde(rename = "fixed")]
    FixedPoint,
}

impl FromStr for PositionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "current" | "follow_cursor" | "follow" => Ok(PositionMode::FollowCursor),
            "fixed" | "fixed_point" => Ok(PositionMode::FixedPoint),
            other => Err(ConfigError::InvalidValue {
                key: "position.mode".into(),
                message: format!("unknown position mode '{other}' (expected current or fixed)"),
            }),
        }
    }
}

impl From<String> for PositionMode {
    fn from(raw: String) -> Self {
        lenient(&raw)
    }
}

fn lenient<T: FromStr + Default>(raw: &str) -> T {
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(value = raw, "unrecognised setting value, using default");
        T::default()
    })
}

/// Screen coordinate in device pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl FromStr for Point {
    type Err = ConfigError;

    /// Parses `X,Y`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidValue {
            key: "position".into(),
            message: format!("expected X,Y but got '{s}'"),
        };
        let (x, y) = s.split_once(',').ok_or_else(invalid)?;
        let x = x.trim().parse().map_err(|_| invalid())?;
        let y = y.trim().parse().map_err(|_| invalid())?;
        Ok(Point { x, y })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickSettings {
    #[serde(default)]
    pub button: MouseButton,
    #[serde(default)]
    pub click_type: ClickType,
    #[serde(default = "default_interval_ms", alias = "interval")]
    pub interval_ms: u64,
    /// 0 means click until stopped.
    #[serde(default)]
    pub repeat_count: u64,
}

fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL_MS
}

impl Default for ClickSettings {
    fn default() -> Self {
        Self {
            button: MouseButton::Left,
            click_type: ClickType::Single,
            interval_ms: DEFAULT_INTERVAL_MS,
            repeat_count: 0,
        }
    }
}

impl ClickSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn is_unbounded(&self) -> bool {
        self.repeat_count == 0
    }

    /// Clamp the interval into `[MIN_INTERVAL_MS, MAX_INTERVAL_MS]`.
    /// A zero interval means "unset" and becomes the default.
    pub fn validated(&self) -> Self {
        let interval_ms = match self.interval_ms {
            0 => DEFAULT_INTERVAL_MS,
            ms => ms.clamp(MIN_INTERVAL_MS, MAX_INTERVAL_MS),
        };
        if interval_ms != self.interval_ms {
            tracing::warn!(
                requested = self.interval_ms,
                applied = interval_ms,
                "click interval out of range, clamped"
            );
        }
        Self {
            interval_ms,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSettings {
    #[serde(default)]
    pub mode: PositionMode,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
}

impl PositionSettings {
    pub fn fixed(x: i32, y: i32) -> Self {
        Self {
            mode: PositionMode::FixedPoint,
            x,
            y,
        }
    }

    /// The coordinate to move to before clicking, if any.
    pub fn target(&self) -> Option<Point> {
        match self.mode {
            PositionMode::FixedPoint => Some(Point::new(self.x, self.y)),
            PositionMode::FollowCursor => None,
        }
    }

    pub fn validated(&self) -> Self {
        Self {
            mode: self.mode,
            x: self.x.max(0),
            y: self.y.max(0),
        }
    }
}

/// Global hotkey names. Registration with the OS happens in the host shell;
/// the core only maps a triggered key name to an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeySettings {
    #[serde(default = "default_toggle_hotkey")]
    pub toggle: String,
    #[serde(default = "default_pause_hotkey")]
    pub pause: String,
}

fn default_toggle_hotkey() -> String {
    "F6".into()
}
fn default_pause_hotkey() -> String {
    "F7".into()
}

impl Default for HotkeySettings {
    fn default() -> Self {
        Self {
            toggle: default_toggle_hotkey(),
            pause: default_pause_hotkey(),
        }
    }
}

impl HotkeySettings {
    /// Trim both keys; an empty key falls back to its default.
    pub fn validated(&self) -> Self {
        fn or_default(key: &str, default: fn() -> String) -> String {
            match key.trim() {
                "" => default(),
                key => key.to_string(),
            }
        }
        Self {
            toggle: or_default(&self.toggle, default_toggle_hotkey),
            pause: or_default(&self.pause, default_pause_hotkey),
        }
    }
}

/// Immutable settings captured at the start of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSettings {
    pub click: ClickSettings,
    pub position: PositionSettings,
}

impl RunSettings {
    pub fn validated(&self) -> Self {
        Self {
            click: self.click.validated(),
            position: self.position.validated(),
        }
    }
}

//! Pointer and keyboard input as delivered by the host.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Double-click detection constants.
pub const DOUBLE_CLICK_TIME_MS: f64 = 500.0;
pub const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A pointer event in device (page) coordinates.
///
/// `time_ms` is the host's event timestamp; it only feeds double-click
/// detection, so any monotonic millisecond clock works.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    pub position: Point,
    #[serde(default)]
    pub button: MouseButton,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub time_ms: f64,
}

impl PointerInput {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            button: MouseButton::Left,
            modifiers: Modifiers::NONE,
            time_ms: 0.0,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn at_time(mut self, time_ms: f64) -> Self {
        self.time_ms = time_ms;
        self
    }
}

/// Keys the board reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Space,
    Delete,
    Backspace,
    Escape,
    Character(char),
    Other(String),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Self {
        match key {
            " " | "Space" | "Spacebar" => Key::Space,
            "Delete" => Key::Delete,
            "Backspace" => Key::Backspace,
            "Escape" | "Esc" => Key::Escape,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Character(c.to_ascii_lowercase()),
                    _ => Key::Other(other.to_string()),
                }
            }
        }
    }
}

/// A key press or release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyInput {
    pub key: Key,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyInput {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }
}

/// Board commands reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Undo,
    Redo,
    Duplicate,
    DeleteSelection,
}

/// Resolve a key press to a command.
///
/// Ctrl/Cmd+Z undoes, Ctrl/Cmd+Y or Ctrl/Cmd+Shift+Z redoes, Ctrl/Cmd+D
/// duplicates, Delete or Backspace removes the selection.
pub fn shortcut_command(input: &KeyInput) -> Option<Command> {
    let command = input.modifiers.command();
    match &input.key {
        Key::Character('z') if command && input.modifiers.shift => Some(Command::Redo),
        Key::Character('z') if command => Some(Command::Undo),
        Key::Character('y') if command => Some(Command::Redo),
        Key::Character('d') if command => Some(Command::Duplicate),
        Key::Delete | Key::Backspace => Some(Command::DeleteSelection),
        _ => None,
    }
}

/// Detects double presses from consecutive left-button presses.
#[derive(Debug, Clone)]
pub struct ClickTracker {
    last: Option<(f64, Point)>,
    max_interval_ms: f64,
    max_distance: f64,
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self::new(DOUBLE_CLICK_TIME_MS, DOUBLE_CLICK_DISTANCE)
    }
}

impl ClickTracker {
    pub fn new(max_interval_ms: f64, max_distance: f64) -> Self {
        Self {
            last: None,
            max_interval_ms,
            max_distance,
        }
    }

    /// Register a press. Returns true when it completes a double click.
    pub fn press(&mut self, input: &PointerInput) -> bool {
        if input.button != MouseButton::Left {
            return false;
        }
        if let Some((last_time, last_pos)) = self.last {
            let elapsed = input.time_ms - last_time;
            let distance = (input.position - last_pos).hypot();
            if (0.0..self.max_interval_ms).contains(&elapsed) && distance < self.max_distance {
                // Reset so a triple click is not a second double click.
                self.last = None;
                return true;
            }
        }
        self.last = Some((input.time_ms, input.position));
        false
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Keyboard state that outlives single events.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Space is held; background drags pan instead of drawing or selecting.
    pub space_held: bool,
    pub clicks: ClickTracker,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input state with custom double-click thresholds.
    pub fn with_double_click(max_interval_ms: f64, max_distance: f64) -> Self {
        Self {
            space_held: false,
            clicks: ClickTracker::new(max_interval_ms, max_distance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: Key, modifiers: Modifiers) -> KeyInput {
        KeyInput::new(k, modifiers)
    }

    #[test]
    fn test_shortcuts() {
        assert_eq!(shortcut_command(&key(Key::Character('z'), Modifiers::CTRL)), Some(Command::Undo));
        let ctrl_shift = Modifiers {
            ctrl: true,
            shift: true,
            ..Modifiers::NONE
        };
        assert_eq!(shortcut_command(&key(Key::Character('z'), ctrl_shift)), Some(Command::Redo));
        let meta = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert_eq!(shortcut_command(&key(Key::Character('y'), meta)), Some(Command::Redo));
        assert_eq!(shortcut_command(&key(Key::Character('d'), Modifiers::CTRL)), Some(Command::Duplicate));
        assert_eq!(shortcut_command(&key(Key::Delete, Modifiers::NONE)), Some(Command::DeleteSelection));
        assert_eq!(shortcut_command(&key(Key::Backspace, Modifiers::NONE)), Some(Command::DeleteSelection));
        assert_eq!(shortcut_command(&key(Key::Character('z'), Modifiers::NONE)), None);
    }

    #[test]
    fn test_key_from_dom() {
        assert_eq!(Key::from_dom(" "), Key::Space);
        assert_eq!(Key::from_dom("Z"), Key::Character('z'));
        assert_eq!(Key::from_dom("Backspace"), Key::Backspace);
        assert_eq!(Key::from_dom("ArrowUp"), Key::Other("ArrowUp".to_string()));
    }

    #[test]
    fn test_double_click_detection() {
        let mut clicks = ClickTracker::default();
        assert!(!clicks.press(&PointerInput::new(10.0, 10.0).at_time(1000.0)));
        assert!(clicks.press(&PointerInput::new(12.0, 11.0).at_time(1200.0)));
        // Third press starts a new sequence.
        assert!(!clicks.press(&PointerInput::new(12.0, 11.0).at_time(1300.0)));
    }

    #[test]
    fn test_slow_or_distant_clicks_are_single() {
        let mut clicks = ClickTracker::default();
        assert!(!clicks.press(&PointerInput::new(10.0, 10.0).at_time(0.0)));
        assert!(!clicks.press(&PointerInput::new(10.0, 10.0).at_time(900.0)));
        assert!(!clicks.press(&PointerInput::new(40.0, 10.0).at_time(950.0)));
    }
}

//! Keyboard shortcut registry and documentation.

use inkboard_core::{Command, Key, KeyInput, Modifiers};

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    /// DOM key name, as delivered in `KeyboardEvent.key`.
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub description: &'static str,
    /// Board command this shortcut runs. `None` for held keys.
    pub command: Option<Command>,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        description: &'static str,
        command: Option<Command>,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            description,
            command,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Shift+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        let key = match self.key {
            " " => "Space".to_string(),
            k if k.chars().count() == 1 => k.to_uppercase(),
            k => k.to_string(),
        };
        let mut formatted = parts.join("+");
        if !formatted.is_empty() {
            formatted.push('+');
        }
        formatted.push_str(&key);
        formatted
    }

    /// The key event that triggers this shortcut.
    pub fn key_input(&self) -> KeyInput {
        KeyInput::new(
            Key::from_dom(self.key),
            Modifiers {
                ctrl: self.ctrl,
                shift: self.shift,
                ..Modifiers::NONE
            },
        )
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("z", true, false, "Undo", Some(Command::Undo)),
            Shortcut::new("z", true, true, "Redo", Some(Command::Redo)),
            Shortcut::new("y", true, false, "Redo", Some(Command::Redo)),
            Shortcut::new("d", true, false, "Duplicate selection", Some(Command::Duplicate)),
            Shortcut::new("Delete", false, false, "Delete selection", Some(Command::DeleteSelection)),
            Shortcut::new("Backspace", false, false, "Delete selection", Some(Command::DeleteSelection)),
            Shortcut::new(" ", false, false, "Hold and drag to pan", None),
        ]
    }

    /// Render all shortcuts as an aligned table.
    pub fn describe() -> String {
        let mut out = String::from("Keyboard shortcuts (Cmd works in place of Ctrl):\n");
        for shortcut in Self::all() {
            out.push_str(&format!("  {:20} {}\n", shortcut.format(), shortcut.description));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkboard_core::input::shortcut_command;

    #[test]
    fn test_registry_matches_engine_bindings() {
        for shortcut in ShortcutRegistry::all() {
            assert_eq!(
                shortcut_command(&shortcut.key_input()),
                shortcut.command,
                "{}",
                shortcut.format()
            );
        }
    }

    #[test]
    fn test_format() {
        let all = ShortcutRegistry::all();
        assert_eq!(all[1].format(), "Ctrl+Shift+Z");
        assert_eq!(all[4].format(), "Delete");
        assert_eq!(all[6].format(), "Space");
    }

    #[test]
    fn test_describe_lists_everything() {
        let text = ShortcutRegistry::describe();
        assert!(text.contains("Ctrl+D"));
        assert!(text.contains("Hold and drag to pan"));
        assert_eq!(text.lines().count(), ShortcutRegistry::all().len() + 1);
    }
}

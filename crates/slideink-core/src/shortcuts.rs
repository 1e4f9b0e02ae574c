//! Keyboard shortcut resolution.

use crate::input::Modifiers;

/// Action bound to a keyboard shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Undo,
    Redo,
}

/// Resolve a key press to a shortcut action.
///
/// While an element is being text-edited the chords belong to the text
/// editor (undoing keystrokes), so nothing resolves.
pub fn resolve(key: &str, modifiers: Modifiers, editing: bool) -> Option<ShortcutAction> {
    if editing || !modifiers.command() {
        return None;
    }
    match key.to_ascii_lowercase().as_str() {
        "z" if modifiers.shift => Some(ShortcutAction::Redo),
        "z" => Some(ShortcutAction::Undo),
        "y" => Some(ShortcutAction::Redo),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctrl() -> Modifiers {
        Modifiers { ctrl: true, ..Default::default() }
    }

    #[test]
    fn test_undo_redo_chords() {
        assert_eq!(resolve("z", ctrl(), false), Some(ShortcutAction::Undo));
        assert_eq!(resolve("Z", ctrl(), false), Some(ShortcutAction::Undo));
        assert_eq!(resolve("y", ctrl(), false), Some(ShortcutAction::Redo));

        let ctrl_shift = Modifiers { ctrl: true, shift: true, ..Default::default() };
        assert_eq!(resolve("z", ctrl_shift, false), Some(ShortcutAction::Redo));

        // Cmd works like ctrl.
        let meta = Modifiers { meta: true, ..Default::default() };
        assert_eq!(resolve("z", meta, false), Some(ShortcutAction::Undo));
    }

    #[test]
    fn test_no_modifier_no_action() {
        assert_eq!(resolve("z", Modifiers::default(), false), None);
        assert_eq!(resolve("x", ctrl(), false), None);
    }

    #[test]
    fn test_editing_swallows_chords() {
        assert_eq!(resolve("z", ctrl(), true), None);
        assert_eq!(resolve("y", ctrl(), true), None);
    }
}

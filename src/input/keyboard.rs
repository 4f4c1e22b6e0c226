//! Keyboard bindings covering AZERTY and QWERTY layouts
//!
//! Each action owns a set of identifiers: logical keys (`event.key`) and
//! physical codes (`event.code`), all lower-cased. A key event matches when
//! either identifier is in the set.

use std::collections::{HashMap, HashSet};

use super::Action;

/// Identifiers that request a level restart
const RESTART_KEYS: [&str; 2] = ["r", "keyr"];

#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: HashMap<Action, HashSet<String>>,
}

impl Default for KeyMap {
    fn default() -> Self {
        let mut map = Self {
            bindings: HashMap::new(),
        };
        map.bind(Action::Up, &["z", "w", "arrowup", "keyw", "keyz"]);
        map.bind(Action::Down, &["s", "arrowdown", "keys"]);
        map.bind(Action::Left, &["q", "a", "arrowleft", "keya", "keyq"]);
        map.bind(Action::Right, &["d", "arrowright", "keyd"]);
        map.bind(Action::Action, &[" ", "space", "enter"]);
        map.bind(Action::Jump, &["z", "w", " ", "space", "keyw", "keyz"]);
        map.bind(Action::Boost, &["shift", "shiftleft", "shiftright"]);
        map.bind(Action::Brake, &["control", "controlleft", "controlright"]);
        map
    }
}

impl KeyMap {
    /// Add identifiers for an action (case-insensitive)
    pub fn bind(&mut self, action: Action, ids: &[&str]) {
        let set = self.bindings.entry(action).or_default();
        for id in ids {
            set.insert(id.to_lowercase());
        }
    }

    pub fn matches(&self, action: Action, id: &str) -> bool {
        self.bindings
            .get(&action)
            .is_some_and(|set| set.contains(&id.to_lowercase()))
    }

    /// Whether any binding (or restart) uses this identifier
    pub fn is_bound(&self, id: &str) -> bool {
        let id = id.to_lowercase();
        RESTART_KEYS.contains(&id.as_str()) || self.bindings.values().any(|s| s.contains(&id))
    }
}

pub fn is_restart_key(key: &str, code: &str) -> bool {
    let key = key.to_lowercase();
    let code = code.to_lowercase();
    RESTART_KEYS.contains(&key.as_str()) || RESTART_KEYS.contains(&code.as_str())
}

/// Currently held identifiers
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    held: HashSet<String>,
}

impl KeyboardState {
    /// Record a key-down. Returns true only for a fresh press (not auto-repeat).
    pub fn key_down(&mut self, key: &str, code: &str) -> bool {
        let key = key.to_lowercase();
        let code = code.to_lowercase();
        let fresh = !self.held.contains(&key) && !self.held.contains(&code);
        self.held.insert(key);
        self.held.insert(code);
        fresh
    }

    pub fn key_up(&mut self, key: &str, code: &str) {
        self.held.remove(&key.to_lowercase());
        self.held.remove(&code.to_lowercase());
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn is_pressed(&self, map: &KeyMap, action: Action) -> bool {
        self.held.iter().any(|id| map.matches(action, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_azerty_and_qwerty_both_move_left() {
        let map = KeyMap::default();
        let mut kb = KeyboardState::default();
        kb.key_down("q", "KeyA"); // AZERTY 'q' sits where QWERTY 'a' is
        assert!(kb.is_pressed(&map, Action::Left));
        kb.key_up("q", "KeyA");
        assert!(!kb.is_pressed(&map, Action::Left));

        kb.key_down("A", "KeyA");
        assert!(kb.is_pressed(&map, Action::Left));
    }

    #[test]
    fn test_space_is_action_and_jump() {
        let map = KeyMap::default();
        let mut kb = KeyboardState::default();
        kb.key_down(" ", "Space");
        assert!(kb.is_pressed(&map, Action::Action));
        assert!(kb.is_pressed(&map, Action::Jump));
        assert!(!kb.is_pressed(&map, Action::Boost));
    }

    #[test]
    fn test_repeat_is_not_fresh() {
        let mut kb = KeyboardState::default();
        assert!(kb.key_down("Shift", "ShiftLeft"));
        assert!(!kb.key_down("Shift", "ShiftLeft"));
    }

    #[test]
    fn test_restart_and_bound_keys() {
        let map = KeyMap::default();
        assert!(is_restart_key("R", "KeyR"));
        assert!(!is_restart_key("t", "KeyT"));
        assert!(map.is_bound("ArrowUp"));
        assert!(!map.is_bound("F5"));
    }
}

//! Keyboard state to per-tick controls

use std::collections::HashSet;

use crate::sim::InputState;

/// Keys currently held, by DOM `KeyboardEvent.key` name
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    held: HashSet<String>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: &str) {
        self.held.insert(key.to_string());
    }

    pub fn key_up(&mut self, key: &str) {
        self.held.remove(key);
    }

    /// Forget everything (restart, focus loss)
    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.held.contains(key)
    }

    /// Map held keys onto controls. Unknown keys are ignored.
    pub fn snapshot(&self) -> InputState {
        let any = |keys: &[&str]| keys.iter().any(|k| self.is_held(k));
        InputState {
            up: any(&["ArrowUp", "w"]),
            down: any(&["ArrowDown", "s"]),
            left: any(&["ArrowLeft", "a"]),
            right: any(&["ArrowRight", "d"]),
            fire: any(&[" "]),
        }
    }
}

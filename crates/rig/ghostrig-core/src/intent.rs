//! Input intent contract plus the key/click fallback used when no structured
//! intent source feeds attacks.

use serde::{Deserialize, Serialize};

/// Opaque source of player intent. The attack flag is consume-once: whoever
/// acts on it clears it.
pub trait IntentSource {
    fn attack_requested(&self) -> bool;
    fn clear_attack(&mut self);
    fn move_vector(&self) -> [f32; 2];
    fn jump_requested(&self) -> bool {
        false
    }
    fn sprint(&self) -> bool {
        false
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputIntent {
    pub attack: bool,
    pub movement: [f32; 2],
    pub jump: bool,
    pub sprint: bool,
}

impl IntentSource for InputIntent {
    fn attack_requested(&self) -> bool {
        self.attack
    }

    fn clear_attack(&mut self) {
        self.attack = false;
    }

    fn move_vector(&self) -> [f32; 2] {
        self.movement
    }

    fn jump_requested(&self) -> bool {
        self.jump
    }

    fn sprint(&self) -> bool {
        self.sprint
    }
}

/// Turns a held level into a pressed-this-tick edge.
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeDetector {
    was_down: bool,
}

impl EdgeDetector {
    pub fn update(&mut self, down: bool) -> bool {
        let pressed = down && !self.was_down;
        self.was_down = down;
        pressed
    }
}

/// Attack key and primary click, polled each tick as held levels.
#[derive(Clone, Copy, Debug, Default)]
pub struct LegacyAttackInput {
    key: EdgeDetector,
    click: EdgeDetector,
}

impl LegacyAttackInput {
    pub fn poll(&mut self, key_down: bool, click_down: bool) -> bool {
        let key = self.key.update(key_down);
        let click = self.click.update(click_down);
        key || click
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_fires_once_per_press() {
        let mut e = EdgeDetector::default();
        assert!(e.update(true));
        assert!(!e.update(true));
        assert!(!e.update(false));
        assert!(e.update(true));
    }

    #[test]
    fn legacy_input_merges_key_and_click() {
        let mut l = LegacyAttackInput::default();
        assert!(l.poll(true, false));
        // it should not refire while the key is held, but a fresh click counts
        assert!(l.poll(true, true));
        assert!(!l.poll(true, true));
        assert!(!l.poll(false, false));
    }

    #[test]
    fn input_intent_clears_attack() {
        let mut i = InputIntent {
            attack: true,
            ..Default::default()
        };
        assert!(i.attack_requested());
        i.clear_attack();
        assert!(!i.attack_requested());
    }
}

use bevy::prelude::*;
use ghostrig::RigConfig;

/// Configuration applied when rigs are wired.
#[derive(Resource, Debug, Clone, Default)]
pub struct RigSettings(pub RigConfig);

/// Local fallback inputs, read only when the input resources exist.
#[derive(Resource, Debug, Clone)]
pub struct InputBindings {
    pub attack_key: KeyCode,
    pub attack_button: MouseButton,
    /// Digit keys 0..5 select expressions.
    pub expression_hotkeys: bool,
}

impl Default for InputBindings {
    fn default() -> Self {
        Self {
            attack_key: KeyCode::KeyE,
            attack_button: MouseButton::Left,
            expression_hotkeys: true,
        }
    }
}

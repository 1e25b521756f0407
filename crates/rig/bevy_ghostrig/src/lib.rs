//! Bevy adapter for `ghostrig`. Put `ControlRig` on a character root and
//! `VisualRig` on a child. The plugin wires them on first sight and then runs
//! the per-frame phases as ordered system sets in `Update`.

use bevy::prelude::*;
use ghostrig::{ClipEvent, Phase, RigConfig, RigEvent, PHASE_ORDER};

pub mod components;
pub mod resources;
pub mod systems;

pub use components::*;
pub use resources::{InputBindings, RigSettings};

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GhostRigSet {
    /// Resolve rigs and insert per-character state.
    Wire,
    Locomotion,
    ControlAdvance,
    Attack,
    Mirror,
    VisualAdvance,
    Expression,
}

impl From<Phase> for GhostRigSet {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Locomotion => GhostRigSet::Locomotion,
            Phase::ControlAdvance => GhostRigSet::ControlAdvance,
            Phase::Attack => GhostRigSet::Attack,
            Phase::Mirror => GhostRigSet::Mirror,
            Phase::VisualAdvance => GhostRigSet::VisualAdvance,
            Phase::Expression => GhostRigSet::Expression,
        }
    }
}

/// A rig event tagged with the entity that produced it.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct GhostRigEvent {
    pub entity: Entity,
    pub event: RigEvent,
}

/// Raised by the host when a visual clip fires a footstep or land notification.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ClipEventRaised {
    pub entity: Entity,
    pub event: ClipEvent,
}

#[derive(Default)]
pub struct GhostRigPlugin {
    pub config: RigConfig,
}

impl GhostRigPlugin {
    pub fn with_config(config: RigConfig) -> Self {
        Self { config }
    }
}

impl Plugin for GhostRigPlugin {
    fn build(&self, app: &mut App) {
        let config = match self.config.validate() {
            Ok(()) => self.config.clone(),
            Err(e) => {
                error!("[ghostrig] invalid rig config, using defaults: {e}");
                RigConfig::default()
            }
        };

        app.insert_resource(RigSettings(config))
            .init_resource::<InputBindings>()
            .add_event::<GhostRigEvent>()
            .add_event::<ClipEventRaised>();

        app.configure_sets(
            Update,
            GhostRigSet::Wire.before(GhostRigSet::from(PHASE_ORDER[0])),
        );
        for pair in PHASE_ORDER.windows(2) {
            app.configure_sets(
                Update,
                GhostRigSet::from(pair[0]).before(GhostRigSet::from(pair[1])),
            );
        }

        app.add_systems(
            Update,
            (
                (systems::wire_control_rigs_system, systems::wire_visual_rigs_system)
                    .in_set(GhostRigSet::Wire),
                systems::drive_locomotion_system.in_set(GhostRigSet::Locomotion),
                systems::advance_control_rigs_system.in_set(GhostRigSet::ControlAdvance),
                systems::attack_system.in_set(GhostRigSet::Attack),
                systems::mirror_system.in_set(GhostRigSet::Mirror),
                (systems::advance_visual_rigs_system, systems::clip_event_system)
                    .chain()
                    .in_set(GhostRigSet::VisualAdvance),
                systems::expression_system.in_set(GhostRigSet::Expression),
            ),
        );
    }
}

use bevy::prelude::*;
use ghostrig::{
    Animator, AttackController, AutoBlink, ExpressionController, GroundState, InputIntent,
    LocomotionDriver, LocomotionMirror,
};

/// Control rig state machine, on the character root.
#[derive(Component)]
pub struct ControlRig(pub Animator);

/// Visual rig state machine. Linked to the `ControlRig` on its parent.
#[derive(Component)]
pub struct VisualRig(pub Animator);

/// Player intent for the character root. The attack flag is consumed by the
/// attack system.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct AttackIntent(pub InputIntent);

/// Ground contact reported by the host's character physics. Assumed grounded
/// when absent.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Grounding(pub GroundState);

/// Inserted on `ControlRig` entities during wiring.
#[derive(Component)]
pub struct Locomotion(pub LocomotionDriver);

/// Inserted on `VisualRig` entities during wiring.
#[derive(Component)]
pub struct AttackAction(pub AttackController);

/// Inserted on `VisualRig` entities during wiring.
#[derive(Component)]
pub struct RigMirror(pub LocomotionMirror);

/// Present when the visual rig carries `ExpressionWeights`.
#[derive(Component)]
pub struct ExpressionBlend(pub ExpressionController);

#[derive(Component)]
pub struct AutoBlinkState(pub AutoBlink);

/// Face weights written every frame; blend-shape bindings read them.
#[derive(Component, Debug, Clone, Default)]
pub struct ExpressionWeights(pub ghostrig::ExpressionWeights);

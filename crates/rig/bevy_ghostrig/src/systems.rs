use bevy::prelude::*;
use ghostrig::{
    AnimationStateMachine, AttackController, AutoBlink, ExpressionController, ExpressionKey,
    GroundState, InputIntent, LocomotionDriver, LocomotionMirror, RigEvent,
};

use crate::components::*;
use crate::resources::{InputBindings, RigSettings};
use crate::{ClipEventRaised, GhostRigEvent};

const EXPRESSION_HOTKEYS: [(KeyCode, u8); 6] = [
    (KeyCode::Digit0, 0),
    (KeyCode::Digit1, 1),
    (KeyCode::Digit2, 2),
    (KeyCode::Digit3, 3),
    (KeyCode::Digit4, 4),
    (KeyCode::Digit5, 5),
];

fn emit(writer: &mut EventWriter<GhostRigEvent>, entity: Entity, events: Vec<RigEvent>) {
    writer.send_batch(events.into_iter().map(|event| GhostRigEvent { entity, event }));
}

pub fn wire_control_rigs_system(
    mut commands: Commands,
    settings: Res<RigSettings>,
    controls: Query<Entity, (With<ControlRig>, Without<Locomotion>)>,
) {
    for entity in &controls {
        let driver = LocomotionDriver::new(settings.0.locomotion.clone());
        commands.entity(entity).insert(Locomotion(driver));
    }
}

/// Resolve each new visual rig's control rig through its parent, once.
pub fn wire_visual_rigs_system(
    mut commands: Commands,
    settings: Res<RigSettings>,
    visuals: Query<
        (Entity, &VisualRig, Option<&Parent>, Option<&ExpressionWeights>),
        Without<RigMirror>,
    >,
    controls: Query<&ControlRig>,
    mut writer: EventWriter<GhostRigEvent>,
) {
    let cfg = &settings.0;
    for (entity, visual, parent, weights) in &visuals {
        let control = parent.and_then(|p| controls.get(p.get()).ok());
        let mut startup = Vec::new();

        let mirror = LocomotionMirror::new(
            control.map(|c| &c.0 as &dyn AnimationStateMachine),
            Some(&visual.0),
            &cfg.mirror,
        )
        .with_value_logging(cfg.diagnostics.log_mirror);
        if !mirror.is_enabled() {
            startup.push(RigEvent::ComponentDisabled {
                component: "mirror".into(),
                reason: "parent has no ControlRig".into(),
            });
        }
        let attack = AttackController::new(cfg.attack.clone(), control.is_some())
            .with_tick_logging(cfg.diagnostics.log_attack);

        let mut entity_commands = commands.entity(entity);
        entity_commands.insert((RigMirror(mirror), AttackAction(attack)));

        if let Some(weights) = weights {
            let blend = ExpressionController::new(&cfg.expression, &weights.0);
            let blink = AutoBlink::new(cfg.blink.clone(), &weights.0);
            if !blink.is_available() {
                startup.push(RigEvent::ComponentDisabled {
                    component: "blink".into(),
                    reason: "no Blink channel".into(),
                });
            }
            entity_commands.insert((ExpressionBlend(blend), AutoBlinkState(blink)));
        }
        emit(&mut writer, entity, startup);
    }
}

pub fn drive_locomotion_system(
    time: Res<Time>,
    mut controls: Query<(
        &mut ControlRig,
        &mut Locomotion,
        Option<&AttackIntent>,
        Option<&Grounding>,
        Option<&Children>,
    )>,
    attacks: Query<&AttackAction>,
) {
    let dt = time.delta_seconds();
    for (mut rig, mut locomotion, intent, ground, children) in &mut controls {
        let multiplier = children
            .and_then(|kids| kids.iter().find_map(|kid| attacks.get(*kid).ok()))
            .map_or(1.0, |action| action.0.move_speed_multiplier());
        let intent = intent.map(|i| i.0).unwrap_or_default();
        let ground = ground.map_or_else(GroundState::on_ground, |g| g.0);
        locomotion.0.tick(dt, &intent, ground, multiplier, &mut rig.0);
    }
}

pub fn advance_control_rigs_system(time: Res<Time>, mut controls: Query<&mut ControlRig>) {
    let dt = time.delta_seconds();
    for mut rig in &mut controls {
        rig.0.advance(dt);
    }
}

pub fn attack_system(
    time: Res<Time>,
    bindings: Res<InputBindings>,
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mouse: Option<Res<ButtonInput<MouseButton>>>,
    mut visuals: Query<(Entity, Option<&Parent>, &mut VisualRig, &mut AttackAction)>,
    mut controls: Query<(&mut ControlRig, Option<&mut AttackIntent>)>,
    mut writer: EventWriter<GhostRigEvent>,
) {
    let dt = time.delta_seconds();
    let fallback = keys.is_some_and(|k| k.just_pressed(bindings.attack_key))
        || mouse.is_some_and(|m| m.just_pressed(bindings.attack_button));

    for (entity, parent, mut visual, mut action) in &mut visuals {
        let mut out = Vec::new();
        let mut no_intent = InputIntent::default();
        match parent.and_then(|p| controls.get_mut(p.get()).ok()) {
            Some((mut rig, Some(mut intent))) => action.0.tick(
                dt,
                &mut intent.0,
                fallback,
                Some(&mut visual.0),
                Some(&mut rig.0),
                &mut out,
            ),
            Some((mut rig, None)) => action.0.tick(
                dt,
                &mut no_intent,
                fallback,
                Some(&mut visual.0),
                Some(&mut rig.0),
                &mut out,
            ),
            None => action.0.tick(
                dt,
                &mut no_intent,
                fallback,
                Some(&mut visual.0),
                None,
                &mut out,
            ),
        }
        emit(&mut writer, entity, out);
    }
}

pub fn mirror_system(
    mut visuals: Query<(Entity, Option<&Parent>, &mut VisualRig, &mut RigMirror)>,
    controls: Query<&ControlRig>,
    mut writer: EventWriter<GhostRigEvent>,
) {
    for (entity, parent, mut visual, mut mirror) in &mut visuals {
        let Some(control) = parent.and_then(|p| controls.get(p.get()).ok()) else {
            continue;
        };
        let mut out = Vec::new();
        mirror.0.tick(&control.0, &mut visual.0, &mut out);
        emit(&mut writer, entity, out);
    }
}

pub fn advance_visual_rigs_system(time: Res<Time>, mut visuals: Query<&mut VisualRig>) {
    let dt = time.delta_seconds();
    for mut rig in &mut visuals {
        rig.0.advance(dt);
    }
}

/// Footstep and land notifications below the weight threshold are dropped.
pub fn clip_event_system(
    mut raised: EventReader<ClipEventRaised>,
    mut writer: EventWriter<GhostRigEvent>,
) {
    for ClipEventRaised { entity, event } in raised.read() {
        if let Some(event) = event.accept() {
            writer.send(GhostRigEvent { entity: *entity, event });
        }
    }
}

fn pressed_hotkey(keys: &ButtonInput<KeyCode>) -> Option<ExpressionKey> {
    EXPRESSION_HOTKEYS
        .iter()
        .find(|(code, _)| keys.just_pressed(*code))
        .and_then(|(_, digit)| ExpressionKey::from_hotkey(*digit))
}

pub fn expression_system(
    time: Res<Time>,
    bindings: Res<InputBindings>,
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mut faces: Query<(
        Entity,
        &mut ExpressionBlend,
        Option<&mut AutoBlinkState>,
        &mut ExpressionWeights,
    )>,
    mut writer: EventWriter<GhostRigEvent>,
) {
    let dt = time.delta_seconds();
    let hotkey = if bindings.expression_hotkeys {
        keys.and_then(|k| pressed_hotkey(&k))
    } else {
        None
    };

    for (entity, mut blend, blink, mut weights) in &mut faces {
        let mut out = Vec::new();
        if let Some(key) = hotkey {
            blend.0.select(key, &mut out);
        }
        blend.0.tick(dt, &mut weights.0);
        if let Some(mut blink) = blink {
            blink.0.tick(dt, &mut weights.0, &mut out);
        }
        emit(&mut writer, entity, out);
    }
}

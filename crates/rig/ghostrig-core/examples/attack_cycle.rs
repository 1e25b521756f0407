//! Walk forward, attack once, and print the overlay every few frames.
//!
//! `RUST_LOG=debug cargo run -p ghostrig-core --example attack_cycle`

use anyhow::Result;
use ghostrig::{
    Animator, AnimatorDefinition, Character, ExpressionKey, ExpressionWeights, FrameInput,
    GroundState, InputIntent, RigConfig, RigEvent,
};
use ghostrig_test_fixtures::animators;

fn main() -> Result<()> {
    env_logger::init();

    let control = Animator::new(animators::load::<AnimatorDefinition>("control-rig")?)?;
    let visual = Animator::new(animators::load::<AnimatorDefinition>("visual-rig")?)?;
    let mut ch = Character::new(
        RigConfig::default(),
        Some(Box::new(control)),
        Some(Box::new(visual)),
    )
    .with_face(Box::new(ExpressionWeights::full()));

    let dt = 1.0 / 30.0;
    for frame in 0..60u32 {
        let mut intent = InputIntent {
            movement: [0.0, 1.0],
            attack: frame == 15,
            ..Default::default()
        };
        let input = FrameInput {
            ground: GroundState::on_ground(),
            expression: (frame == 10).then_some(ExpressionKey::Happy),
            ..Default::default()
        };
        let out = ch.step(dt, &mut intent, &input);

        for e in &out.events {
            if !matches!(e, RigEvent::BlinkStarted | RigEvent::BlinkFinished) {
                println!("[{:>3}] {:?}", out.epoch, e);
            }
        }
        if let Some(snapshot) = out.snapshot.filter(|_| frame % 10 == 0) {
            for line in snapshot.overlay_lines() {
                println!("      {line}");
            }
        }
    }
    Ok(())
}

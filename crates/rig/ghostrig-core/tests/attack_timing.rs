use ghostrig::params::ATTACK;
use ghostrig::testing::ScriptedMachine;
use ghostrig::{AttackConfig, AttackController, InputIntent, RigEvent};

fn press() -> InputIntent {
    InputIntent {
        attack: true,
        ..Default::default()
    }
}

/// Drive ticks at `dt` with a single intent on the first tick; returns
/// (time, attacking, multiplier) per tick.
fn timeline(dt: f32, ticks: usize) -> Vec<(f32, bool, f32)> {
    let mut atk = AttackController::new(AttackConfig::default(), true);
    let mut local = ScriptedMachine::locomotion(true);
    let mut events = Vec::new();
    let mut out = Vec::with_capacity(ticks);
    for k in 0..ticks {
        let mut intent = if k == 0 { press() } else { InputIntent::default() };
        atk.tick(dt, &mut intent, false, Some(&mut local), None, &mut events);
        out.push((k as f32 * dt, atk.is_attacking(), atk.move_speed_multiplier()));
    }
    assert_eq!(local.trigger_count(ATTACK), 1);
    out
}

#[test]
fn attacking_on_half_open_window_at_ten_hz() {
    for (t, attacking, mult) in timeline(0.1, 15) {
        let inside = t < 0.8 - 1e-4;
        assert_eq!(attacking, inside, "t={t}");
        assert_eq!(mult, if inside { 0.1 } else { 1.0 }, "t={t}");
    }
}

#[test]
fn attacking_on_half_open_window_at_sixty_hz() {
    let dt = 1.0 / 60.0;
    let samples = timeline(dt, 90);
    let last_attacking = samples.iter().rposition(|s| s.1).unwrap();
    // ticks 0..=47 (t < 0.8) attack, tick 48 (t = 0.8) is idle
    assert_eq!(last_attacking, 47);
    assert!(samples[..48].iter().all(|s| s.1));
    assert!(samples[48..].iter().all(|s| !s.1));
}

#[test]
fn repeated_presses_during_attack_do_not_retrigger() {
    let mut atk = AttackController::new(AttackConfig::default(), true);
    let mut local = ScriptedMachine::locomotion(true);
    let mut control = ScriptedMachine::locomotion(true);
    let mut events = Vec::new();
    for _ in 0..7 {
        atk.tick(0.1, &mut press(), false, Some(&mut local), Some(&mut control), &mut events);
    }
    assert_eq!(local.trigger_count(ATTACK), 1);
    assert_eq!(control.trigger_count(ATTACK), 1);
    assert_eq!(atk.attacks_started(), 1);
    assert_eq!(
        events.iter().filter(|e| **e == RigEvent::AttackIgnored).count(),
        6
    );
}

#[test]
fn new_attack_may_start_on_the_tick_the_last_one_ends() {
    let mut atk = AttackController::new(AttackConfig::default(), true);
    let mut events = Vec::new();
    for k in 0..=8 {
        atk.tick(0.1, &mut press(), false, None, None, &mut events);
        if k < 8 {
            assert_eq!(atk.attacks_started(), 1);
        }
    }
    assert_eq!(atk.attacks_started(), 2);
    let finished = events.iter().position(|e| *e == RigEvent::AttackFinished).unwrap();
    assert!(matches!(events[finished + 1], RigEvent::AttackStarted { .. }));
}

#[test]
fn zero_duration_attack_ends_next_tick() {
    let cfg = AttackConfig {
        attack_duration: 0.0,
        ..Default::default()
    };
    let mut atk = AttackController::new(cfg, false);
    let mut events = Vec::new();
    atk.tick(0.016, &mut press(), false, None, None, &mut events);
    assert!(atk.is_attacking());
    atk.tick(0.016, &mut InputIntent::default(), false, None, None, &mut events);
    assert!(!atk.is_attacking());
}

//! # Trial scenario tests
//!
//! End-to-end runs of the controller on a virtual clock:
//!
//! - worked examples (no input, reversal between ticks)
//! - direction-change rate limiting and response logging
//! - termination: absorbing state, no late log entries
//! - determinism of scripted replays

use std::time::Duration;

use mtrack_core::{Direction, DrawLog, KeyCode, KeyEvent, NullSink, TrialResult, TrialState};
use mtrack_experiment::{KeyScript, ScriptedKey, StepOutcome, TrialConfig, TrialController, replay};
use mtrack_timing::{ManualTimer, Scheduler, Timer};

// ─── Helpers ────────────────────────────────────────────────────────

fn unit_config() -> TrialConfig {
    TrialConfig {
        speed: 1.0,
        initial_direction: Direction::Increase,
        boundary_left: 0.0,
        boundary_right: 5.0,
        start_position: 2.0,
        frame_time_ms: 10,
        frame_gap_ms: 0,
        ..TrialConfig::new("dot.png")
    }
}

fn key(code: KeyCode, rt_ms: f64) -> KeyEvent {
    KeyEvent { code, rt_ms }
}

fn tick(
    c: &mut TrialController<ManualTimer>,
    s: &mut Scheduler<ManualTimer>,
    sink: &mut DrawLog,
) -> StepOutcome {
    s.wait().expect("schedule still active");
    c.step(sink)
}

fn finish(
    c: &mut TrialController<ManualTimer>,
    s: &mut Scheduler<ManualTimer>,
    sink: &mut DrawLog,
) -> TrialResult {
    loop {
        if let StepOutcome::Terminated(result) = tick(c, s, sink) {
            return result;
        }
    }
}

// ─── Worked examples ────────────────────────────────────────────────

#[test]
fn no_input_runs_to_the_inclusive_right_boundary() {
    let timer = ManualTimer::new();
    let mut c = TrialController::new(unit_config(), timer.clone());
    let mut s = c.start().unwrap();
    let mut sink = DrawLog::default();

    let result = finish(&mut c, &mut s, &mut sink);

    // 5 is on the boundary and still drawn; 6 terminates.
    assert_eq!(sink.positions, vec![2.0, 3.0, 4.0, 5.0]);
    let times: Vec<f64> = result.animation_sequence.iter().map(|e| e.time_ms).collect();
    assert_eq!(times, vec![10.0, 20.0, 30.0, 40.0]);
    assert!(result.responses.is_empty());
    assert!(result
        .animation_sequence
        .iter()
        .all(|e| e.stimulus.as_str() == "dot.png"));
    assert_eq!(timer.now(), 50_000_000);
}

#[test]
fn decrease_between_ticks_reverses_on_the_next_tick() {
    let timer = ManualTimer::new();
    let mut c = TrialController::new(unit_config(), timer.clone());
    let mut s = c.start().unwrap();
    let mut sink = DrawLog::default();

    assert_eq!(tick(&mut c, &mut s, &mut sink), StepOutcome::Rendered);
    assert_eq!(c.motion().unwrap().position, 3.0);

    timer.advance(Duration::from_millis(4));
    assert!(c.handle_key(key(KeyCode::F, 14.0)));
    // Staged only; motion is untouched until the tick.
    assert_eq!(c.motion().unwrap().velocity, 1.0);

    assert_eq!(tick(&mut c, &mut s, &mut sink), StepOutcome::Rendered);
    let m = c.motion().unwrap();
    assert_eq!(m.velocity, -1.0);
    assert_eq!(m.position, 2.0);

    let result = finish(&mut c, &mut s, &mut sink);
    assert_eq!(sink.positions, vec![2.0, 3.0, 2.0, 1.0, 0.0]);
    assert_eq!(result.responses.len(), 1);
    assert_eq!(result.responses[0].key, KeyCode::F);
    assert_eq!(result.responses[0].rt_ms, 14.0);
    assert_eq!(
        result.responses[0]
            .stimulus_at_response
            .as_ref()
            .map(|s| s.as_str()),
        Some("dot.png")
    );
}

// ─── Input semantics ────────────────────────────────────────────────

#[test]
fn only_the_last_request_between_ticks_is_applied() {
    let mut c = TrialController::new(unit_config(), ManualTimer::new());
    let mut s = c.start().unwrap();
    let mut sink = DrawLog::default();

    for (i, code) in [KeyCode::F, KeyCode::J, KeyCode::F, KeyCode::J].into_iter().enumerate() {
        c.handle_key(key(code, i as f64));
    }
    tick(&mut c, &mut s, &mut sink);

    // One acceleration, not a reversal and not four changes.
    assert_eq!(c.motion().unwrap().velocity, 2.0);
    assert_eq!(c.pending(), None);

    tick(&mut c, &mut s, &mut sink);
    assert_eq!(c.motion().unwrap().velocity, 2.0);

    let result = finish(&mut c, &mut s, &mut sink);
    assert_eq!(result.responses.len(), 4);
}

#[test]
fn repeated_same_direction_presses_accumulate_one_per_tick() {
    let cfg = TrialConfig {
        boundary_right: 100.0,
        ..unit_config()
    };
    let mut c = TrialController::new(cfg, ManualTimer::new());
    let mut s = c.start().unwrap();
    let mut sink = DrawLog::default();

    let mut velocities = Vec::new();
    for _ in 0..3 {
        c.handle_key(key(KeyCode::J, 0.0));
        tick(&mut c, &mut s, &mut sink);
        velocities.push(c.motion().unwrap().velocity);
    }
    assert_eq!(velocities, vec![2.0, 3.0, 4.0]);

    c.handle_key(key(KeyCode::F, 0.0));
    tick(&mut c, &mut s, &mut sink);
    assert_eq!(c.motion().unwrap().velocity, -1.0);
}

#[test]
fn every_accepted_key_is_logged_once() {
    let mut c = TrialController::new(unit_config(), ManualTimer::new());
    let mut s = c.start().unwrap();
    let mut sink = DrawLog::default();

    let presses = [
        key(KeyCode(32), 1.0),
        key(KeyCode::J, 2.0),
        key(KeyCode(81), 3.0),
        key(KeyCode::J, 4.0),
    ];
    for p in presses {
        assert!(c.handle_key(p));
    }
    let result = finish(&mut c, &mut s, &mut sink);
    let logged: Vec<(KeyCode, f64)> = result.responses.iter().map(|r| (r.key, r.rt_ms)).collect();
    let sent: Vec<(KeyCode, f64)> = presses.iter().map(|p| (p.code, p.rt_ms)).collect();
    assert_eq!(logged, sent);
}

#[test]
fn custom_control_keys_replace_f_and_j() {
    let cfg = TrialConfig {
        control_keys: mtrack_core::ControlKeys {
            decrease: KeyCode(37),
            increase: KeyCode(39),
        },
        ..unit_config()
    };
    let mut c = TrialController::new(cfg, ManualTimer::new());
    let mut s = c.start().unwrap();
    let mut sink = DrawLog::default();

    c.handle_key(key(KeyCode::F, 0.0));
    tick(&mut c, &mut s, &mut sink);
    assert_eq!(c.motion().unwrap().velocity, 1.0);

    c.handle_key(key(KeyCode(37), 11.0));
    tick(&mut c, &mut s, &mut sink);
    assert_eq!(c.motion().unwrap().velocity, -1.0);
}

// ─── Termination ────────────────────────────────────────────────────

#[test]
fn start_outside_bounds_terminates_on_first_tick() {
    let cfg = TrialConfig {
        start_position: -0.5,
        ..unit_config()
    };
    let mut c = TrialController::new(cfg, ManualTimer::new());
    let mut s = c.start().unwrap();
    let mut sink = DrawLog::default();
    let result = finish(&mut c, &mut s, &mut sink);
    assert_eq!(result, TrialResult::default());
    assert_eq!(sink.clears, 1);
}

#[test]
fn terminated_is_absorbing() {
    let timer = ManualTimer::new();
    let mut c = TrialController::new(unit_config(), timer.clone());
    let mut s = c.start().unwrap();
    let script = KeyScript::from(vec![
        ScriptedKey::new(15.0, KeyCode(32)),
        ScriptedKey::new(500.0, KeyCode::F),
        ScriptedKey::new(900.0, KeyCode::J),
    ]);

    let result = replay(&mut c, &mut s, &mut NullSink, &script).unwrap();
    let end_ms = timer.now() as f64 / 1e6;

    assert_eq!(end_ms, 50.0);
    assert_eq!(result.responses.len(), 1);
    assert!(result.last_timestamp_ms().unwrap() <= end_ms);
    assert_eq!(c.state(), TrialState::Terminated);
    assert!(s.is_cancelled());
    assert_eq!(s.poll(), None);
    assert!(!c.handle_key(key(KeyCode::F, 501.0)));
}

#[test]
fn no_out_of_bounds_frame_is_ever_drawn() {
    let scripts = [
        vec![],
        vec![ScriptedKey::new(5.0, KeyCode::F)],
        vec![
            ScriptedKey::new(5.0, KeyCode::F),
            ScriptedKey::new(25.0, KeyCode::J),
            ScriptedKey::new(26.0, KeyCode::J),
            ScriptedKey::new(45.0, KeyCode::J),
        ],
        vec![
            ScriptedKey::new(10.0, KeyCode::J),
            ScriptedKey::new(20.0, KeyCode::F),
            ScriptedKey::new(30.0, KeyCode::F),
            ScriptedKey::new(40.0, KeyCode::F),
        ],
    ];
    for keys in scripts {
        let cfg = TrialConfig {
            speed: 0.75,
            ..unit_config()
        };
        let mut c = TrialController::new(cfg, ManualTimer::new());
        let mut s = c.start().unwrap();
        let mut sink = DrawLog::default();
        let result = replay(&mut c, &mut s, &mut sink, &KeyScript::from(keys)).unwrap();

        assert_eq!(sink.positions.len(), result.frame_count());
        assert_eq!(sink.clears, result.frame_count() + 1);
        assert!(sink.positions.iter().all(|p| (0.0..=5.0).contains(p)));
    }
}

// ─── Determinism ────────────────────────────────────────────────────

#[test]
fn identical_inputs_produce_identical_results() {
    let script = KeyScript::from(vec![
        ScriptedKey::new(3.0, KeyCode::J),
        ScriptedKey::new(17.5, KeyCode::F),
        ScriptedKey::new(18.0, KeyCode(32)),
        ScriptedKey::new(41.0, KeyCode::F),
    ]);
    let cfg = TrialConfig {
        speed: 0.5,
        frame_time_ms: 7,
        frame_gap_ms: 3,
        ..unit_config()
    };

    let run = || {
        let mut c = TrialController::new(cfg.clone(), ManualTimer::new());
        let mut s = c.start().unwrap();
        let mut sink = DrawLog::default();
        let result = replay(&mut c, &mut s, &mut sink, &script).unwrap();
        (result, sink)
    };

    let (first, first_draws) = run();
    let (second, second_draws) = run();
    assert_eq!(first, second);
    assert_eq!(first_draws, second_draws);
    assert_eq!(first.response_count(), 4);
    assert_eq!(
        first.to_trial_data().unwrap(),
        second.to_trial_data().unwrap()
    );
}

//! Runs without a window: scripted replay and keycodes read from stdin.

use std::io::{self, BufRead};
use std::path::Path;
use std::sync::mpsc::{self, Sender};
use std::thread;

use anyhow::{Context, Result};
use mtrack_core::{Frame, KeyCode, KeyEvent, KeyFilter, NullSink, RenderSink, TrialResult};
use mtrack_experiment::{KeyScript, TrialConfig, TrialController, replay, run_live};
use mtrack_render::{PromptFont, SkiaSink};
use mtrack_timing::{HighPrecisionTimer, ManualTimer, Timer};
use tracing::{debug, info, warn};

pub struct Snapshot<'a> {
    pub path: &'a Path,
    pub width: u32,
    pub height: u32,
    pub font: PromptFont,
}

/// Wraps a canvas so the clear issued on the terminating tick never reaches
/// it: clears are deferred until the next draw, leaving the last drawn frame
/// on the canvas when the trial ends.
struct LastFrame<'a> {
    canvas: &'a mut SkiaSink,
    dirty: bool,
}

impl RenderSink for LastFrame<'_> {
    fn clear(&mut self) {
        self.dirty = true;
    }

    fn draw(&mut self, frame: &Frame<'_>) {
        if self.dirty {
            self.canvas.clear();
            self.dirty = false;
        }
        self.canvas.draw(frame);
    }
}

pub fn replay_script(
    config: TrialConfig,
    script: &Path,
    virtual_clock: bool,
    snapshot: Option<Snapshot<'_>>,
) -> Result<TrialResult> {
    let script = KeyScript::load(script)
        .with_context(|| format!("loading key script {}", script.display()))?
        .filtered(&config.accepted_keys);
    info!(keys = script.len(), virtual_clock, "replaying key script");

    if virtual_clock {
        replay_with(config, ManualTimer::new(), &script, snapshot)
    } else {
        replay_with(config, HighPrecisionTimer::new(), &script, snapshot)
    }
}

fn replay_with<T: Timer>(
    config: TrialConfig,
    timer: T,
    script: &KeyScript,
    snapshot: Option<Snapshot<'_>>,
) -> Result<TrialResult> {
    let mut controller = TrialController::new(config, timer);
    let mut scheduler = controller.start()?;

    let Some(snapshot) = snapshot else {
        return Ok(replay(&mut controller, &mut scheduler, &mut NullSink, script)?);
    };
    let mut canvas = SkiaSink::new(snapshot.width, snapshot.height)?.with_font(snapshot.font);
    let result = replay(
        &mut controller,
        &mut scheduler,
        &mut LastFrame {
            canvas: &mut canvas,
            dirty: false,
        },
        script,
    )?;
    canvas.save_png(snapshot.path)?;
    info!(path = %snapshot.path.display(), "wrote last frame");
    Ok(result)
}

/// Keys arrive as one decimal keycode per line. Reaction times are stamped
/// when the line is read.
pub fn read_stdin(config: TrialConfig) -> Result<TrialResult> {
    let timer = HighPrecisionTimer::new();
    let accepted = config.accepted_keys.clone();
    let mut controller = TrialController::new(config, timer.clone());
    let mut scheduler = controller.start()?;
    let start = controller
        .started_at_ns()
        .context("trial did not enter the running state")?;

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || capture_stdin(tx, timer, start, accepted));
    info!("reading keycodes from stdin, one per line");

    Ok(run_live(&mut controller, &mut scheduler, &mut NullSink, &rx)?)
}

fn capture_stdin(
    tx: Sender<KeyEvent>,
    timer: HighPrecisionTimer,
    start: u64,
    accepted: KeyFilter,
) {
    for line in io::stdin().lock().lines() {
        let Ok(line) = line else {
            break;
        };
        let Some(code) = parse_keycode(&line) else {
            if !line.trim().is_empty() {
                warn!(line = line.trim(), "ignoring line that is not a keycode");
            }
            continue;
        };
        if !accepted.accepts(code) {
            debug!(code = code.0, "key not accepted");
            continue;
        }
        let rt_ms = timer.elapsed(start).as_nanos() as f64 / 1e6;
        if tx.send(KeyEvent { code, rt_ms }).is_err() {
            break;
        }
    }
}

fn parse_keycode(line: &str) -> Option<KeyCode> {
    line.trim().parse().ok().map(KeyCode)
}

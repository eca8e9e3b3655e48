use std::sync::Arc;
use std::time::Instant;

use mtrack_core::{KeyEvent, KeyFilter, TrialError, TrialResult};
use mtrack_experiment::{StepOutcome, TrialConfig, TrialController, log_pacing};
use mtrack_render::{PromptFont, RenderError, SkiaSink};
use mtrack_timing::{HighPrecisionTimer, Scheduler};
use pixels::{Pixels, SurfaceTexture};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    error::{EventLoopError, OsError},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode as Physical, PhysicalKey},
    window::{Fullscreen, Window, WindowId},
};

use crate::keymap::legacy_keycode;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("event loop failed: {0}")]
    EventLoop(#[source] EventLoopError),
    #[error("no monitor available")]
    NoMonitor,
    #[error("failed to create window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize pixel surface: {0}")]
    CreateSurface(#[source] pixels::Error),
    #[error("failed to present frame: {0}")]
    Present(#[source] pixels::Error),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Trial(#[from] TrialError),
    #[error("window closed before the marker left the bounds")]
    Aborted,
}

/// Fullscreen trial window. Ticks are polled from `about_to_wait`, so key
/// handling and frame steps share the event loop thread.
pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    sink: Option<SkiaSink>,
    font: Option<PromptFont>,
    controller: TrialController<HighPrecisionTimer>,
    scheduler: Option<Scheduler<HighPrecisionTimer>>,
    accepted: KeyFilter,
    result: Option<TrialResult>,
    failure: Option<AppError>,
}

impl App {
    pub fn new(config: TrialConfig, font: PromptFont) -> Self {
        let accepted = config.accepted_keys.clone();
        Self {
            window: None,
            pixels: None,
            sink: None,
            font: Some(font),
            controller: TrialController::new(config, HighPrecisionTimer::new()),
            scheduler: None,
            accepted,
            result: None,
            failure: None,
        }
    }

    pub fn run(mut self) -> Result<TrialResult, AppError> {
        let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
        info!(
            platform = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            "starting trial window, ESC aborts"
        );
        event_loop.run_app(&mut self).map_err(AppError::EventLoop)?;

        if let Some(err) = self.failure.take() {
            return Err(err);
        }
        self.result.take().ok_or(AppError::Aborted)
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .ok_or(AppError::NoMonitor)?;
        let refresh_hz = monitor
            .refresh_rate_millihertz()
            .map(|rate| rate as f64 / 1000.0);

        let attributes = Window::default_attributes()
            .with_title("mtrack")
            .with_fullscreen(Some(Fullscreen::Borderless(Some(monitor))))
            .with_resizable(false);
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(AppError::CreateWindow)?,
        );
        let size = window.inner_size();
        info!(
            width = size.width,
            height = size.height,
            scale = window.scale_factor(),
            refresh_hz,
            "display configured"
        );

        let surface = SurfaceTexture::new(size.width, size.height, window.clone());
        self.pixels =
            Some(Pixels::new(size.width, size.height, surface).map_err(AppError::CreateSurface)?);
        let mut sink = SkiaSink::new(size.width, size.height)?;
        if let Some(font) = self.font.take() {
            sink = sink.with_font(font);
        }
        self.sink = Some(sink);

        window.set_cursor_visible(false);
        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn present(&mut self) -> Result<(), AppError> {
        let (Some(pixels), Some(sink)) = (self.pixels.as_mut(), self.sink.as_ref()) else {
            return Ok(());
        };
        let frame = pixels.frame_mut();
        if frame.len() != sink.frame_data().len() {
            debug!("surface and canvas sizes differ, skipping present");
            return Ok(());
        }
        frame.copy_from_slice(sink.frame_data());
        pixels.render().map_err(AppError::Present)
    }

    fn resize(&mut self, size: PhysicalSize<u32>) -> Result<(), AppError> {
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }
        if let Some(pixels) = self.pixels.as_mut() {
            if let Err(e) = pixels.resize_surface(size.width, size.height) {
                warn!(error = %e, "failed to resize surface");
            }
            if let Err(e) = pixels.resize_buffer(size.width, size.height) {
                warn!(error = %e, "failed to resize buffer");
            }
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.resize(size.width, size.height)?;
        }
        Ok(())
    }

    fn handle_key(&mut self, key: PhysicalKey, event_loop: &ActiveEventLoop) {
        let PhysicalKey::Code(physical) = key else {
            return;
        };
        if physical == Physical::Escape {
            warn!("trial aborted from keyboard");
            event_loop.exit();
            return;
        }
        let Some(code) = legacy_keycode(physical) else {
            debug!(?physical, "key has no legacy code");
            return;
        };
        if !self.accepted.accepts(code) {
            return;
        }
        let Some(rt_ms) = self.controller.elapsed_ms() else {
            return;
        };
        self.controller.handle_key(KeyEvent { code, rt_ms });
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        error!(error = %err, "stopping trial window");
        if let Some(scheduler) = self.scheduler.as_ref() {
            scheduler.cancel();
        }
        self.failure = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.create_window_and_surface(event_loop) {
            self.fail(event_loop, e);
            return;
        }
        match self.controller.start() {
            Ok(scheduler) => self.scheduler = Some(scheduler),
            Err(e) => self.fail(event_loop, e.into()),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() && !event.repeat {
                    self.handle_key(event.physical_key, event_loop);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.present() {
                    self.fail(event_loop, e);
                }
            }
            WindowEvent::Resized(size) => {
                if let Err(e) = self.resize(size) {
                    self.fail(event_loop, e);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(scheduler) = self.scheduler.as_mut() else {
            return;
        };
        if scheduler.poll().is_some() {
            let Some(sink) = self.sink.as_mut() else {
                return;
            };
            match self.controller.step(sink) {
                StepOutcome::Rendered => {
                    if let Some(window) = self.window.as_ref() {
                        window.request_redraw();
                    }
                }
                StepOutcome::Terminated(result) => {
                    log_pacing(scheduler);
                    info!(frames = result.frame_count(), "marker left the bounds");
                    self.result = Some(result);
                    self.scheduler = None;
                    event_loop.exit();
                    return;
                }
            }
        }

        if let Some(wait) = scheduler.time_until_next() {
            event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + wait));
        }
    }
}

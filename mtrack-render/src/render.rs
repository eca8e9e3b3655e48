use std::path::Path;

use mtrack_core::{Frame, RenderSink};
use thiserror::Error;
use tiny_skia::{Color, Paint, Pixmap, PixmapPaint, Rect, Transform};
use tracing::info;

use crate::text::PromptFont;

const MARKER_SIZE: f32 = 20.0;
const BOUNDARY_WIDTH: f32 = 20.0;
const BOUNDARY_HEIGHT: f32 = 100.0;
const PROMPT_TOP: i32 = 20;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot allocate a {width}x{height} canvas")]
    InvalidSize { width: u32, height: u32 },
    #[error("failed to write PNG: {0}")]
    Png(String),
    #[error("failed to read font {path}: {source}")]
    FontIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid font: {0}")]
    Font(String),
}

/// Pixel render sink. Positions are fractions of the viewport width; the
/// marker and both boundary bars hang from the vertical middle, anchored at
/// their top-left corner. The prompt is centred near the top edge.
pub struct SkiaSink {
    canvas: Pixmap,
    background: Color,
    foreground: Color,
    font: Option<PromptFont>,
    prompt_cache: Option<(String, Option<Pixmap>)>,
    prompt_logged: bool,
}

impl SkiaSink {
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let canvas = Pixmap::new(width, height).ok_or(RenderError::InvalidSize { width, height })?;
        let mut sink = Self {
            canvas,
            background: Color::from_rgba8(0, 0, 0, 255),
            foreground: Color::from_rgba8(255, 255, 255, 255),
            font: None,
            prompt_cache: None,
            prompt_logged: false,
        };
        sink.fill_background();
        Ok(sink)
    }

    /// Without a font the prompt is only logged.
    pub fn with_font(mut self, font: PromptFont) -> Self {
        self.font = Some(font);
        self.prompt_cache = None;
        self
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.canvas =
            Pixmap::new(width, height).ok_or(RenderError::InvalidSize { width, height })?;
        self.fill_background();
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.canvas
    }

    /// RGBA8 bytes, ready to copy into a pixel surface of the same size.
    pub fn frame_data(&self) -> &[u8] {
        self.canvas.data()
    }

    pub fn to_screen_x(&self, position: f64) -> f32 {
        (position * self.canvas.width() as f64) as f32
    }

    pub fn save_png(&self, path: &Path) -> Result<(), RenderError> {
        self.canvas
            .save_png(path)
            .map_err(|e| RenderError::Png(e.to_string()))
    }

    fn fill_background(&mut self) {
        self.canvas.fill(self.background);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        // Non-finite positions have nothing sensible to draw.
        let Some(rect) = Rect::from_xywh(x, y, w, h) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(self.foreground);
        self.canvas.fill_rect(rect, &paint, Transform::identity(), None);
    }

    fn draw_prompt(&mut self, prompt: &str) {
        let Some(font) = self.font.as_ref() else {
            if !self.prompt_logged {
                info!(prompt, "no prompt font loaded, prompt is not drawn");
                self.prompt_logged = true;
            }
            return;
        };
        if self.prompt_cache.as_ref().is_none_or(|(text, _)| text != prompt) {
            self.prompt_cache = Some((prompt.to_owned(), font.rasterize(prompt)));
        }
        let Some((_, Some(text))) = self.prompt_cache.as_ref() else {
            return;
        };
        let x = (self.canvas.width() as i32 - text.width() as i32) / 2;
        self.canvas.draw_pixmap(
            x,
            PROMPT_TOP,
            text.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }
}

impl RenderSink for SkiaSink {
    fn clear(&mut self) {
        self.fill_background();
    }

    fn draw(&mut self, frame: &Frame<'_>) {
        let top = self.canvas.height() as f32 / 2.0;

        let left = self.to_screen_x(frame.boundary_left);
        let right = self.to_screen_x(frame.boundary_right);
        self.fill_rect(left, top, BOUNDARY_WIDTH, BOUNDARY_HEIGHT);
        self.fill_rect(right, top, BOUNDARY_WIDTH, BOUNDARY_HEIGHT);

        let x = self.to_screen_x(frame.position);
        self.fill_rect(x, top, MARKER_SIZE, MARKER_SIZE);

        if let Some(prompt) = frame.prompt {
            self.draw_prompt(prompt);
        }
    }
}

use std::path::Path;

use ab_glyph::{Font, FontVec, Glyph, PxScale, ScaleFont, point};
use tiny_skia::{Pixmap, PremultipliedColorU8};

use crate::RenderError;

const BUNDLED: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// Font used to rasterize the prompt line.
pub struct PromptFont {
    font: FontVec,
    size_px: f32,
}

impl PromptFont {
    pub const DEFAULT_SIZE_PX: f32 = 24.0;

    /// DejaVu Sans, shipped with the crate.
    pub fn bundled() -> Result<Self, RenderError> {
        Self::from_bytes(BUNDLED.to_vec())
    }

    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let bytes = std::fs::read(path).map_err(|source| RenderError::FontIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, RenderError> {
        let font = FontVec::try_from_vec(bytes).map_err(|e| RenderError::Font(e.to_string()))?;
        Ok(Self {
            font,
            size_px: Self::DEFAULT_SIZE_PX,
        })
    }

    pub fn with_size(mut self, size_px: f32) -> Self {
        self.size_px = size_px;
        self
    }

    /// White text on a transparent, tightly cropped pixmap. `None` when the
    /// text has no visible glyphs.
    pub fn rasterize(&self, text: &str) -> Option<Pixmap> {
        let scale = PxScale::from(self.size_px);
        let sf = self.font.as_scaled(scale);

        // Baseline at ascent.
        let mut pen_x = 0.0f32;
        let mut glyphs: Vec<Glyph> = Vec::with_capacity(text.len());
        for ch in text.chars() {
            let id = self.font.glyph_id(ch);
            if let Some(prev) = glyphs.last() {
                pen_x += sf.kern(prev.id, id);
            }
            glyphs.push(Glyph {
                id,
                scale,
                position: point(pen_x, sf.ascent()),
            });
            pen_x += sf.h_advance(id);
        }

        let outlined: Vec<_> = glyphs
            .into_iter()
            .filter_map(|g| self.font.outline_glyph(g))
            .collect();
        let (mut min_x, mut min_y) = (f32::INFINITY, f32::INFINITY);
        let (mut max_x, mut max_y) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
        for out in &outlined {
            let b = out.px_bounds();
            min_x = min_x.min(b.min.x);
            min_y = min_y.min(b.min.y);
            max_x = max_x.max(b.max.x);
            max_y = max_y.max(b.max.y);
        }
        if outlined.is_empty() {
            return None;
        }

        let w = (max_x.ceil() - min_x.floor()).max(1.0) as u32;
        let h = (max_y.ceil() - min_y.floor()).max(1.0) as u32;
        let mut pm = Pixmap::new(w, h)?;
        let stride = w as usize;
        let dst = pm.pixels_mut();

        for out in &outlined {
            let b = out.px_bounds();
            out.draw(|x, y, cov| {
                let ix = (x as f32 + b.min.x - min_x) as usize;
                let iy = (y as f32 + b.min.y - min_y) as usize;
                if ix >= stride {
                    return;
                }
                let Some(px) = dst.get_mut(iy * stride + ix) else {
                    return;
                };
                // Overlapping glyph edges keep the stronger coverage.
                let v = (cov.clamp(0.0, 1.0) * 255.0) as u8;
                if v > px.alpha() {
                    if let Some(white) = PremultipliedColorU8::from_rgba(v, v, v, v) {
                        *px = white;
                    }
                }
            });
        }
        Some(pm)
    }
}

use crate::StimulusId;

/// Everything a render sink needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub stimulus: &'a StimulusId,
    pub position: f64,
    pub boundary_left: f64,
    pub boundary_right: f64,
    pub prompt: Option<&'a str>,
}

/// Draws trial frames. The controller never reads anything back.
pub trait RenderSink {
    /// Called at the start of every tick, including the one that terminates.
    fn clear(&mut self) {}

    fn draw(&mut self, frame: &Frame<'_>);
}

impl<S: RenderSink + ?Sized> RenderSink for &mut S {
    fn clear(&mut self) {
        (**self).clear()
    }

    fn draw(&mut self, frame: &Frame<'_>) {
        (**self).draw(frame)
    }
}

/// Discards every frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn draw(&mut self, _frame: &Frame<'_>) {}
}

/// Records drawn positions and clear calls for assertions in tests.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DrawLog {
    pub positions: Vec<f64>,
    pub clears: usize,
}

impl RenderSink for DrawLog {
    fn clear(&mut self) {
        self.clears += 1;
    }

    fn draw(&mut self, frame: &Frame<'_>) {
        self.positions.push(frame.position);
    }
}

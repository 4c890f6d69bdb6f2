use crate::engine::frame::Frame;
use crate::foundation::error::RaceResult;
use crate::render::Renderer;

/// Renderer that keeps every frame in memory.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    frames: Vec<Frame>,
    finished: bool,
}

impl RecordingRenderer {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames drawn so far, in tick order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Most recent frame.
    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// `true` once the redraw loop has exited.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Take ownership of the recorded frames.
    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

impl Renderer for RecordingRenderer {
    fn draw(&mut self, frame: &Frame) -> RaceResult<()> {
        self.frames.push(frame.clone());
        Ok(())
    }

    fn finish(&mut self) -> RaceResult<()> {
        self.finished = true;
        Ok(())
    }
}

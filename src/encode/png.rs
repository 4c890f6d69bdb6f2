use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{RaceError, RaceResult};
use crate::render::raster::FrameRGBA;

/// Writes each frame as `frame_NNNNNN.png` into a directory.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    cfg: Option<SinkConfig>,
    written: u64,
}

impl PngSequenceSink {
    /// Sink writing into `dir` (created on `begin`).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cfg: None,
            written: 0,
        }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of files written since `begin`.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// File name used for frame `idx`.
    pub fn file_name(idx: FrameIndex) -> String {
        format!("frame_{:06}.png", idx.0)
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> RaceResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create png output dir '{}'", self.dir.display()))?;
        self.cfg = Some(cfg);
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> RaceResult<()> {
        if self.cfg.is_none() {
            return Err(RaceError::encode("png sink not started"));
        }
        let path = self.dir.join(Self::file_name(idx));
        write_png(&path, frame)?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> RaceResult<()> {
        tracing::debug!(dir = %self.dir.display(), frames = self.written, "png sequence written");
        self.cfg = None;
        Ok(())
    }
}

/// Write one frame as a straight-alpha PNG.
pub fn write_png(path: &Path, frame: &FrameRGBA) -> RaceResult<()> {
    image::save_buffer_with_format(
        path,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| RaceError::encode(format!("write png '{}': {e}", path.display())))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;

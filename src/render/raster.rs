use std::path::PathBuf;
use std::sync::Arc;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::engine::frame::Frame;
use crate::foundation::core::{Canvas, Fps, Rgba8};
use crate::foundation::error::{RaceError, RaceResult};
use crate::foundation::math::{mul_div255_u16, unpremultiply_rgba8};
use crate::render::Renderer;
use crate::render::svg::{SvgStyle, frame_to_svg};

/// A rasterized frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Straight-alpha copy of the pixel data.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        if !self.premultiplied {
            return self.data.clone();
        }
        self.data
            .chunks_exact(4)
            .flat_map(|px| unpremultiply_rgba8([px[0], px[1], px[2], px[3]]))
            .collect()
    }

    /// Composite over an opaque `background` into `dst` (straight RGBA8, alpha 255).
    ///
    /// Handles both straight and premultiplied input. `dst` must hold `width * height * 4`
    /// bytes.
    pub fn flatten_onto(&self, background: Rgba8, dst: &mut [u8]) -> RaceResult<()> {
        let expected = self.width as usize * self.height as usize * 4;
        if self.data.len() != expected || dst.len() != expected {
            return Err(RaceError::validation(format!(
                "flatten expects {expected} bytes for {}x{}, got {} into {}",
                self.width,
                self.height,
                self.data.len(),
                dst.len()
            )));
        }

        let bg = [background.r, background.g, background.b].map(u16::from);
        for (d, s) in dst.chunks_exact_mut(4).zip(self.data.chunks_exact(4)) {
            let a = u16::from(s[3]);
            for c in 0..3 {
                let src = if self.premultiplied {
                    u16::from(s[c])
                } else {
                    mul_div255_u16(u16::from(s[c]), a)
                };
                d[c] = (src + mul_div255_u16(bg[c], 255 - a)).min(255) as u8;
            }
            d[3] = 255;
        }
        Ok(())
    }
}

/// Options for [`FrameRasterizer`].
#[derive(Clone, Debug)]
pub struct RasterOpts {
    /// Output pixels per logical canvas pixel.
    pub pixel_ratio: f32,
    /// Load the system font database.
    pub system_fonts: bool,
    /// Extra directories scanned for fonts.
    pub font_dirs: Vec<PathBuf>,
    /// SVG presentation.
    pub style: SvgStyle,
}

impl Default for RasterOpts {
    fn default() -> Self {
        Self {
            pixel_ratio: 1.0,
            system_fonts: true,
            font_dirs: Vec::new(),
            style: SvgStyle::default(),
        }
    }
}

/// Turns [`Frame`]s into premultiplied RGBA8 pixels via `usvg` + `resvg`.
pub struct FrameRasterizer {
    usvg_opts: usvg::Options<'static>,
    pixel_ratio: f32,
    style: SvgStyle,
}

impl std::fmt::Debug for FrameRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameRasterizer")
            .field("pixel_ratio", &self.pixel_ratio)
            .field("font_faces", &self.usvg_opts.fontdb.len())
            .finish_non_exhaustive()
    }
}

impl FrameRasterizer {
    /// Build the font database and validate `opts`.
    pub fn new(opts: &RasterOpts) -> RaceResult<Self> {
        if !opts.pixel_ratio.is_finite() || opts.pixel_ratio <= 0.0 {
            return Err(RaceError::validation(format!(
                "pixel ratio must be finite and > 0, got {}",
                opts.pixel_ratio
            )));
        }

        let mut db = usvg::fontdb::Database::new();
        if opts.system_fonts {
            db.load_system_fonts();
        }
        for dir in &opts.font_dirs {
            db.load_fonts_dir(dir);
        }
        tracing::debug!(faces = db.len(), "font database ready");

        Ok(Self {
            usvg_opts: usvg::Options {
                fontdb: Arc::new(db),
                ..Default::default()
            },
            pixel_ratio: opts.pixel_ratio,
            style: opts.style.clone(),
        })
    }

    /// Pixel size of a rasterized `canvas`.
    pub fn output_size(&self, canvas: Canvas) -> (u32, u32) {
        let scale = |v: u32| ((v as f32 * self.pixel_ratio).round() as u32).max(1);
        (scale(canvas.width), scale(canvas.height))
    }

    /// Rasterize one frame.
    pub fn rasterize(&self, frame: &Frame) -> RaceResult<FrameRGBA> {
        let svg = frame_to_svg(frame, &self.style);
        let tree = usvg::Tree::from_str(&svg, &self.usvg_opts)
            .map_err(|e| RaceError::render(format!("parse frame svg: {e}")))?;

        let (width, height) = self.output_size(frame.canvas);
        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
            RaceError::render(format!("failed to allocate {width}x{height} pixmap"))
        })?;
        let xform = resvg::tiny_skia::Transform::from_scale(self.pixel_ratio, self.pixel_ratio);
        resvg::render(&tree, xform, &mut pixmap.as_mut());

        Ok(FrameRGBA {
            width,
            height,
            data: pixmap.take(),
            premultiplied: true,
        })
    }
}

/// [`Renderer`] that rasterizes every frame and pushes it into a [`FrameSink`].
///
/// The sink is started lazily with the size of the first frame and ended in
/// [`Renderer::finish`].
#[derive(Debug)]
pub struct RasterRenderer<S: FrameSink> {
    rasterizer: FrameRasterizer,
    sink: S,
    fps: Fps,
    started: bool,
}

impl<S: FrameSink> RasterRenderer<S> {
    /// Renderer pushing into `sink` at `fps`.
    pub fn new(rasterizer: FrameRasterizer, sink: S, fps: Fps) -> Self {
        Self {
            rasterizer,
            sink,
            fps,
            started: false,
        }
    }

    /// Borrow the sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Give back the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<S: FrameSink> Renderer for RasterRenderer<S> {
    fn draw(&mut self, frame: &Frame) -> RaceResult<()> {
        let rgba = self.rasterizer.rasterize(frame)?;
        if !self.started {
            self.sink.begin(SinkConfig {
                width: rgba.width,
                height: rgba.height,
                fps: self.fps,
            })?;
            self.started = true;
        }
        self.sink.push_frame(frame.index, &rgba)
    }

    fn finish(&mut self) -> RaceResult<()> {
        if !self.started {
            return Ok(());
        }
        self.started = false;
        self.sink.end()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;

//! Frame consumers.
//!
//! The engine hands each redraw tick's [`Frame`] to a [`Renderer`] and never reads anything back.
//! [`crate::frame_to_svg`] turns a frame into an SVG document and [`crate::RasterRenderer`]
//! rasterizes that into pixels for a [`crate::FrameSink`].

use crate::engine::frame::Frame;
use crate::foundation::error::RaceResult;

pub(crate) mod format;
pub(crate) mod raster;
pub(crate) mod record;
pub(crate) mod svg;

/// Consumer of redraw ticks.
pub trait Renderer {
    /// Draw one frame. Called once per redraw tick, in tick order.
    fn draw(&mut self, frame: &Frame) -> RaceResult<()>;

    /// Called once when the redraw loop exits.
    fn finish(&mut self) -> RaceResult<()> {
        Ok(())
    }
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn draw(&mut self, frame: &Frame) -> RaceResult<()> {
        (**self).draw(frame)
    }

    fn finish(&mut self) -> RaceResult<()> {
        (**self).finish()
    }
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn draw(&mut self, frame: &Frame) -> RaceResult<()> {
        (**self).draw(frame)
    }

    fn finish(&mut self) -> RaceResult<()> {
        (**self).finish()
    }
}

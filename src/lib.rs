//! barrace is a bar chart race animation engine.
//!
//! A race steps through the timeline keys shared by a set of [`Series`]. At every step each
//! bar eases toward its value at the next key, bars swap slots as their ranks change, and a
//! redraw loop samples an immutable [`Frame`] per display tick for a [`Renderer`].
//!
//! - Load and validate [`RaceData`] and a [`RaceConfig`]
//! - Build a [`RaceEngine`] over a [`Clock`]
//! - Drive it with [`RaceEngine::init`], or [`RaceEngine::step`] for manual control
//! - Render with [`RecordingRenderer`], [`frame_to_svg`], or a [`RasterRenderer`] feeding a
//!   [`FrameSink`] ([`PngSequenceSink`], [`FfmpegSink`])
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod encode;
pub(crate) mod engine;
pub(crate) mod render;
pub(crate) mod scene;
pub(crate) mod timeline;

pub use crate::foundation::core::{
    Axis, Canvas, Fps, FrameIndex, PALETTE, Padding, Point, Rect, Rgba8,
};
pub use crate::foundation::error::{RaceError, RaceResult};

pub use crate::animation::clock::{Clock, TokioClock};
pub use crate::animation::ease::{Ease, lerp, smoother_step};
pub use crate::animation::tween::{Lerp, Tween};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::png::{PngSequenceSink, write_png};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::engine::bar::{BarController, BarMetrics, BarSample};
pub use crate::engine::cancel::CancelToken;
pub use crate::engine::config::RaceConfig;
pub use crate::engine::frame::{BarLayout, BarView, Frame, TimelineView};
pub use crate::engine::race::{RaceEngine, RacePhase, RaceStats, StepOutcome};
pub use crate::engine::rank::{RankStrategy, adjacent_swap_pass};
pub use crate::render::Renderer;
pub use crate::render::format::format_number;
pub use crate::render::raster::{FrameRGBA, FrameRasterizer, RasterOpts, RasterRenderer};
pub use crate::render::record::RecordingRenderer;
pub use crate::render::svg::{SvgStyle, frame_to_svg};
pub use crate::scene::series::{RaceData, Sample, Series, TimelineKey};
pub use crate::timeline::cursor::{Timeline, TimelineCursor};
pub use crate::timeline::snapshot::{RankedSnapshot, Snapshot};

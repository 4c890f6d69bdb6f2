use std::ffi::OsString;
use std::io::{Read, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use anyhow::Context as _;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, Rgba8};
use crate::foundation::error::{RaceError, RaceResult};
use crate::render::raster::FrameRGBA;

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 path.
    pub out_path: PathBuf,
    /// Replace an existing file.
    pub overwrite: bool,
    /// Opaque color behind transparent pixels; H.264 has no alpha.
    pub background: Rgba8,
}

impl FfmpegSinkOpts {
    /// Options writing to `out_path`, overwriting, over white.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            background: Rgba8::rgb(0xff, 0xff, 0xff),
        }
    }
}

/// Encodes the race as H.264 MP4 by piping raw RGBA frames into the system `ffmpeg`.
#[derive(Debug)]
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    encoder: Option<Encoder>,
}

/// One running `ffmpeg` process, alive between `begin` and `end`.
#[derive(Debug)]
struct Encoder {
    cfg: SinkConfig,
    child: Child,
    stdin: ChildStdin,
    stderr: JoinHandle<std::io::Result<Vec<u8>>>,
    opaque: Vec<u8>,
    last: Option<FrameIndex>,
    pushed: u64,
}

impl FfmpegSink {
    /// Sink writing to `opts.out_path`. Nothing is spawned until `begin`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            encoder: None,
        }
    }

    fn spawn(&self, cfg: SinkConfig) -> RaceResult<Encoder> {
        let mut child = Command::new("ffmpeg")
            .args(encoder_args(&cfg, &self.opts))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| RaceError::encode(format!("spawn ffmpeg: {e}")))?;

        let (Some(stdin), Some(mut stderr)) = (child.stdin.take(), child.stderr.take()) else {
            return Err(RaceError::encode("ffmpeg pipes were not opened"));
        };
        let stderr = std::thread::spawn(move || {
            let mut log = Vec::new();
            stderr.read_to_end(&mut log)?;
            Ok(log)
        });

        Ok(Encoder {
            opaque: vec![0; cfg.width as usize * cfg.height as usize * 4],
            cfg,
            child,
            stdin,
            stderr,
            last: None,
            pushed: 0,
        })
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> RaceResult<()> {
        if self.encoder.is_some() {
            return Err(RaceError::encode("ffmpeg sink already started"));
        }
        cfg.fps.validate()?;
        if cfg.width == 0
            || cfg.height == 0
            || !cfg.width.is_multiple_of(2)
            || !cfg.height.is_multiple_of(2)
        {
            return Err(RaceError::validation(format!(
                "mp4 output needs non-zero even dimensions, got {}x{}",
                cfg.width, cfg.height
            )));
        }

        let out = &self.opts.out_path;
        ensure_parent_dir(out)?;
        if !self.opts.overwrite && out.exists() {
            return Err(RaceError::validation(format!(
                "'{}' exists and overwrite is off",
                out.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(RaceError::encode("mp4 output needs `ffmpeg` on PATH"));
        }

        let encoder = self.spawn(cfg)?;
        tracing::debug!(
            out = %out.display(),
            width = encoder.cfg.width,
            height = encoder.cfg.height,
            "encoding mp4"
        );
        self.encoder = Some(encoder);
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> RaceResult<()> {
        let Some(enc) = self.encoder.as_mut() else {
            return Err(RaceError::encode("ffmpeg sink not started"));
        };
        if enc.last.is_some_and(|last| idx <= last) {
            return Err(RaceError::encode(format!(
                "frame {} pushed out of order",
                idx.0
            )));
        }
        if (frame.width, frame.height) != (enc.cfg.width, enc.cfg.height) {
            return Err(RaceError::validation(format!(
                "frame is {}x{}, encoder expects {}x{}",
                frame.width, frame.height, enc.cfg.width, enc.cfg.height
            )));
        }

        frame.flatten_onto(self.opts.background, &mut enc.opaque)?;
        enc.stdin
            .write_all(&enc.opaque)
            .map_err(|e| RaceError::encode(format!("write frame {} to ffmpeg: {e}", idx.0)))?;
        enc.last = Some(idx);
        enc.pushed += 1;
        Ok(())
    }

    fn end(&mut self) -> RaceResult<()> {
        let Encoder {
            mut child,
            stdin,
            stderr,
            pushed,
            ..
        } = self
            .encoder
            .take()
            .ok_or_else(|| RaceError::encode("ffmpeg sink not started"))?;

        // Closing stdin is the end-of-stream signal.
        drop(stdin);
        let status = child
            .wait()
            .map_err(|e| RaceError::encode(format!("wait for ffmpeg: {e}")))?;
        let log = stderr
            .join()
            .map_err(|_| RaceError::encode("ffmpeg stderr reader panicked"))?
            .map_err(|e| RaceError::encode(format!("read ffmpeg stderr: {e}")))?;

        if !status.success() {
            return Err(RaceError::encode(format!(
                "ffmpeg failed ({status}): {}",
                String::from_utf8_lossy(&log).trim()
            )));
        }
        tracing::debug!(out = %self.opts.out_path.display(), frames = pushed, "mp4 written");
        Ok(())
    }
}

/// Command line for a raw RGBA stdin -> H.264/yuv420p MP4 encode.
fn encoder_args(cfg: &SinkConfig, opts: &FfmpegSinkOpts) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        if opts.overwrite { "-y" } else { "-n" },
        "-loglevel",
        "error",
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgba",
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    args.push("-s".into());
    args.push(format!("{}x{}", cfg.width, cfg.height).into());
    // `-r` ahead of `-i` is the input frame rate.
    args.push("-r".into());
    args.push(format!("{}/{}", cfg.fps.num, cfg.fps.den).into());
    args.extend(
        [
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ]
        .map(OsString::from),
    );
    args.push(opts.out_path.clone().into_os_string());
    args
}

/// Create the parent directory of `path` if needed.
pub fn ensure_parent_dir(path: &Path) -> RaceResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output directory '{}'", parent.display()))?;
            Ok(())
        }
        _ => Ok(()),
    }
}

/// `true` when `ffmpeg -version` runs successfully.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;

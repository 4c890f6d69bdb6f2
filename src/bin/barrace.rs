use std::path::{Path, PathBuf};

use anyhow::Context as _;
use barrace::{
    CancelToken, Clock as _, FfmpegSink, FfmpegSinkOpts, FrameRasterizer, FrameSink,
    PngSequenceSink, RaceConfig, RaceData, RaceEngine, RankStrategy, RasterOpts, RasterRenderer,
    StepOutcome, TokioClock,
};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "barrace", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play the whole race and encode it.
    Render(RenderArgs),
    /// Play the race up to one key and write that frame as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct CommonArgs {
    /// Input race data JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Race configuration JSON. Defaults apply to missing fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Rank reordering strategy (overrides the config file).
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Output pixels per canvas pixel.
    #[arg(long, default_value_t = 1.0)]
    pixel_ratio: f32,

    /// Extra font directory (repeatable).
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Output MP4 path, or directory for `--format png`.
    #[arg(long)]
    out: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Mp4)]
    format: OutputFormat,

    /// How long the final frame is held, in milliseconds (when the config sets none).
    #[arg(long, default_value_t = 1000)]
    hold_ms: u64,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Timeline key index (0-based) to settle on.
    #[arg(long)]
    key_index: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    AdjacentSwap,
    Precomputed,
}

impl From<StrategyArg> for RankStrategy {
    fn from(v: StrategyArg) -> Self {
        match v {
            StrategyArg::AdjacentSwap => RankStrategy::AdjacentSwap,
            StrategyArg::Precomputed => RankStrategy::Precomputed,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Mp4,
    Png,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    // Offline rendering: virtual time advances as fast as frames are produced.
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .context("build tokio runtime")?;
    match cli.cmd {
        Command::Render(args) => rt.block_on(cmd_render(args)),
        Command::Frame(args) => rt.block_on(cmd_frame(args)),
    }
}

fn load(common: &CommonArgs) -> anyhow::Result<(RaceConfig, RaceData)> {
    let mut config = match &common.config {
        Some(path) => RaceConfig::from_path(path)?,
        None => RaceConfig::default(),
    };
    if let Some(strategy) = common.strategy {
        config.rank_strategy = strategy.into();
    }
    let data = RaceData::from_path(&common.in_path)?;
    Ok((config, data))
}

fn rasterizer(common: &CommonArgs) -> anyhow::Result<FrameRasterizer> {
    Ok(FrameRasterizer::new(&RasterOpts {
        pixel_ratio: common.pixel_ratio,
        font_dirs: common.font_dirs.clone(),
        ..RasterOpts::default()
    })?)
}

async fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (mut config, data) = load(&args.common)?;
    config.hold_after_settle_ms.get_or_insert(args.hold_ms);
    let fps = config.fps;

    let mut engine = RaceEngine::new(config, data, TokioClock::new())?;
    let sink: Box<dyn FrameSink> = match args.format {
        OutputFormat::Mp4 => Box::new(FfmpegSink::new(FfmpegSinkOpts::new(&args.out))),
        OutputFormat::Png => Box::new(PngSequenceSink::new(&args.out)),
    };
    let mut renderer = RasterRenderer::new(rasterizer(&args.common)?, sink, fps);

    let stats = engine.init(&mut renderer, &CancelToken::new()).await?;
    eprintln!(
        "wrote {} ({} frames, {} steps, {} swaps)",
        args.out.display(),
        stats.frames,
        stats.steps,
        stats.swaps
    );
    Ok(())
}

async fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (config, data) = load(&args.common)?;
    let mut engine = RaceEngine::new(config, data, TokioClock::new())?;
    engine.seed()?;

    let cancel = CancelToken::new();
    while engine.cursor_index() < args.key_index as isize {
        if let StepOutcome::Settled = engine.step(&cancel).await? {
            anyhow::bail!(
                "key index {} is out of range (timeline has {} keys)",
                args.key_index,
                engine.cursor_index() + 1
            );
        }
    }
    settle_ranks(&engine).await?;

    let frame = engine.frame();
    let rgba = rasterizer(&args.common)?.rasterize(&frame)?;
    write_png_file(&args.out, &rgba)?;
    eprintln!(
        "wrote {} (key {})",
        args.out.display(),
        frame.current_key.as_ref().map_or("-", |k| k.as_str())
    );
    Ok(())
}

/// Run rank passes until no bar is swapping; the step loop alone never reorders adjacent bars.
async fn settle_ranks(engine: &RaceEngine) -> anyhow::Result<()> {
    loop {
        let now = engine.clock().now();
        let swaps = engine.reorder(now)?;
        let moving = engine.bars().iter().any(|b| b.sample(now).swapping);
        if swaps == 0 && !moving {
            return Ok(());
        }
        engine.clock().sleep(engine.config().swap()).await;
    }
}

fn write_png_file(path: &Path, rgba: &barrace::FrameRGBA) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    barrace::write_png(path, rgba)?;
    Ok(())
}

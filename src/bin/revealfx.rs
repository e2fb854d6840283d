use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use revealfx::{
    AssetSlot, Canvas, DepthParallax, EffectMount, EffectsConfig, FrameRGBA, FrameTick,
    FsImageLoader, HostEvent, ImageLoader, LiquidReveal, ManualHost, NormPoint, Point,
    PreparedImage, Rect, SlotStatus, Vec2,
};

#[derive(Parser, Debug)]
#[command(name = "revealfx", version)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a pointer script through the liquid reveal and write the last frame as a PNG.
    Reveal(RevealArgs),
    /// Sample a depth map at a normalized position and print the parallax translation.
    Parallax(ParallaxArgs),
}

#[derive(Parser, Debug)]
struct RevealArgs {
    /// Image revealed under the pointer trail.
    #[arg(long)]
    reveal: PathBuf,

    /// Optional image drawn underneath the reveal.
    #[arg(long)]
    base: Option<PathBuf>,

    /// Pointer script JSON.
    #[arg(long)]
    script: PathBuf,

    /// Surface width in pixels.
    #[arg(long)]
    width: u32,

    /// Surface height in pixels.
    #[arg(long)]
    height: u32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Effect config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Frames to run; defaults to the script's length.
    #[arg(long)]
    frames: Option<u64>,
}

#[derive(Parser, Debug)]
struct ParallaxArgs {
    /// Grayscale depth map.
    #[arg(long)]
    depth: PathBuf,

    /// Normalized pointer position as `X,Y`.
    #[arg(long, value_parser = parse_norm_point)]
    at: NormPoint,

    /// Override the configured intensity.
    #[arg(long)]
    intensity: Option<f64>,

    /// Effect config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Scripted pointer input, replayed frame by frame.
#[derive(Debug, serde::Deserialize)]
struct Script {
    /// Frames to run when not given on the command line.
    #[serde(default)]
    frames: Option<u64>,
    /// Refresh rate used for frame timestamps.
    #[serde(default = "default_hz")]
    hz: f64,
    events: Vec<ScriptEvent>,
}

#[derive(Debug, serde::Deserialize)]
struct ScriptEvent {
    /// Frame before which the event is delivered.
    frame: u64,
    #[serde(flatten)]
    action: ScriptAction,
}

#[derive(Clone, Copy, Debug, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ScriptAction {
    Move { x: f64, y: f64 },
    Touch { x: f64, y: f64 },
    Leave,
}

impl ScriptAction {
    fn to_event(self) -> HostEvent {
        match self {
            Self::Move { x, y } => HostEvent::PointerMove {
                client: Point::new(x, y),
            },
            Self::Touch { x, y } => HostEvent::TouchMove {
                client: Point::new(x, y),
            },
            Self::Leave => HostEvent::PointerLeave,
        }
    }
}

fn default_hz() -> f64 {
    60.0
}

#[derive(Debug, serde::Serialize)]
struct ParallaxReport {
    depth_url: String,
    enabled: bool,
    intensity: f64,
    at: NormPoint,
    depth: f64,
    translation: Vec2,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Reveal(args) => cmd_reveal(args),
        Command::Parallax(args) => cmd_parallax(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_norm_point(s: &str) -> Result<NormPoint, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid coordinate '{v}': {e}"))
    };
    Ok(NormPoint::new(parse(x)?, parse(y)?))
}

fn read_config(path: Option<&Path>) -> anyhow::Result<EffectsConfig> {
    match path {
        Some(p) => Ok(EffectsConfig::from_json_path(p)?),
        None => Ok(EffectsConfig::default()),
    }
}

fn read_script(path: &Path) -> anyhow::Result<Script> {
    let f = File::open(path).with_context(|| format!("open script '{}'", path.display()))?;
    let script: Script = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse script '{}'", path.display()))?;
    Ok(script)
}

/// Loader rooted at the file's directory plus the file name as URL.
fn loader_for(path: &Path) -> anyhow::Result<(Arc<dyn ImageLoader>, String)> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("image path '{}' has no usable file name", path.display()))?;
    let root = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let loader: Arc<dyn ImageLoader> = Arc::new(FsImageLoader::new(root));
    Ok((loader, name.to_owned()))
}

fn load_image_blocking(path: &Path) -> anyhow::Result<AssetSlot<PreparedImage>> {
    let (loader, url) = loader_for(path)?;
    let mut slot = AssetSlot::load_image(loader, url);
    if slot.wait().is_none() {
        anyhow::bail!("failed to load image '{}'", path.display());
    }
    Ok(slot)
}

fn cmd_reveal(args: RevealArgs) -> anyhow::Result<()> {
    let cfg = read_config(args.config.as_deref())?;
    let script = read_script(&args.script)?;

    let image = load_image_blocking(&args.reveal)?;
    let base = match &args.base {
        Some(p) => load_image_blocking(p)?.get().cloned(),
        None => None,
    };

    let bounds = Rect::new(0.0, 0.0, f64::from(args.width), f64::from(args.height));
    let canvas = Canvas::from_bounds(bounds);
    anyhow::ensure!(!canvas.is_empty(), "surface must be at least 1x1");
    canvas.to_u16()?;
    let mut events: Vec<&ScriptEvent> = script.events.iter().collect();
    events.sort_by_key(|e| e.frame);

    let frames = args
        .frames
        .or(script.frames)
        .unwrap_or_else(|| events.last().map_or(1, |e| e.frame + 1));

    let mut mount = EffectMount::mount(
        LiquidReveal::new(cfg.reveal, image)?,
        ManualHost::new(bounds),
    );
    let mut next = events.iter().peekable();
    for i in 0..frames {
        while let Some(e) = next.next_if(|e| e.frame <= i) {
            mount.dispatch(e.action.to_event());
        }
        mount.advance(FrameTick::at_rate(i, script.hz));
    }
    let stats = mount.effect().stats().clone();
    tracing::info!(?stats, frames, "reveal replay finished");

    let frame = mount.effect().frame();
    mount.unmount();

    let data = match base {
        Some(base) => {
            let mut out = revealfx::render_cover(&base, canvas)?;
            revealfx::over_in_place(&mut out, &frame.data, 1.0)?;
            out
        }
        None => frame.data,
    };
    let out = FrameRGBA {
        width: canvas.width,
        height: canvas.height,
        data,
        premultiplied: true,
    }
    .into_straight();

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &out.data,
        out.width,
        out.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({} frames, {} composites)",
        args.out.display(),
        stats.frames,
        stats.composites
    );
    Ok(())
}

fn cmd_parallax(args: ParallaxArgs) -> anyhow::Result<()> {
    let mut cfg = read_config(args.config.as_deref())?;
    if let Some(i) = args.intensity {
        cfg.parallax.intensity = i;
        cfg.validate()?;
    }

    let (loader, url) = loader_for(&args.depth)?;
    let mut mapper = DepthParallax::new(cfg.parallax.clone(), loader, url.clone())?;
    if let Some(sampler) = mapper.sampler_mut()
        && sampler.wait() == SlotStatus::Failed
    {
        anyhow::bail!("failed to load depth map '{}'", args.depth.display());
    }

    let sample = mapper.sample_at(args.at);
    let report = ParallaxReport {
        depth_url: url,
        enabled: cfg.parallax.enabled,
        intensity: cfg.parallax.intensity,
        at: sample.pos,
        depth: sample.depth,
        translation: sample.offset,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("serialize parallax report")?
    );
    Ok(())
}

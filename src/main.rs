use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, Level};

use clipforge::{
    config::Config,
    overlay::TextOverlaySpec,
    pipeline::EditPipeline,
    plan::{AudioMixSpec, EditPlan, TrimRange},
    render::CancelToken,
};

#[derive(Parser)]
#[command(
    name = "clipforge",
    version,
    about = "Trim, filter, retime, caption and re-score a video clip",
    long_about = "Clipforge applies a pipeline of frame-level edits to a source video — \
trimming, color filters, playback-speed changes, text captions and background \
audio — and renders the result to a new file."
)]
struct Cli {
    /// Source video file (mp4, avi, mov, mkv)
    #[arg(short, long)]
    input: PathBuf,

    /// Output video file path
    #[arg(short, long)]
    output: PathBuf,

    /// Background audio file (mp3, wav, aac)
    #[arg(short, long)]
    audio: Option<PathBuf>,

    /// Edit plan TOML file; replaces the individual edit flags below
    #[arg(long)]
    plan: Option<PathBuf>,

    /// Trim start time in seconds
    #[arg(long)]
    trim_start: Option<f64>,

    /// Trim end time in seconds
    #[arg(long)]
    trim_end: Option<f64>,

    /// Pixel filter (none, grayscale, sepia, mirror-horizontal)
    #[arg(short, long, default_value = "none")]
    filter: String,

    /// Playback speed factor
    #[arg(short, long, default_value_t = 1.0)]
    speed: f64,

    /// Caption text to overlay
    #[arg(long)]
    text: Option<String>,

    /// Caption position (top, center, bottom, left, right)
    #[arg(long, default_value = "bottom")]
    text_anchor: String,

    /// Caption font size in pixels (10-100)
    #[arg(long, default_value_t = 50)]
    text_size: u32,

    /// Caption color as #RRGGBB
    #[arg(long, default_value = "#ffffff")]
    text_color: String,

    /// Caption font (arial, courier, liberation-sans, impact)
    #[arg(long, default_value = "arial")]
    text_font: String,

    /// Background audio volume (applies when --audio is set)
    #[arg(long, default_value_t = 0.5)]
    audio_volume: f32,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Assemble the edit plan from a plan file or the individual flags.
    fn build_plan(&self) -> anyhow::Result<EditPlan> {
        if let Some(plan_path) = &self.plan {
            info!("Loading edit plan from {:?}", plan_path);
            return EditPlan::from_file(plan_path).map_err(|e| anyhow::anyhow!(e.user_message()));
        }

        let trim = match (self.trim_start, self.trim_end) {
            (Some(start), Some(end)) => Some(TrimRange { start, end }),
            (None, None) => None,
            _ => anyhow::bail!("--trim-start and --trim-end must be given together"),
        };

        let overlay = match &self.text {
            Some(text) => Some(TextOverlaySpec {
                content: text.clone(),
                font: self.text_font.parse()?,
                size_px: self.text_size,
                color: self.text_color.parse()?,
                anchor: self.text_anchor.parse()?,
                window: None,
            }),
            None => None,
        };

        let audio = self.audio.as_ref().map(|_| AudioMixSpec {
            enabled: true,
            volume: self.audio_volume,
        });

        Ok(EditPlan {
            trim,
            filter: self.filter.parse()?,
            speed: self.speed,
            overlay,
            audio,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .init();

    info!("Starting clipforge v{}", env!("CARGO_PKG_VERSION"));
    info!("Input: {:?}", cli.input);
    info!("Output: {:?}", cli.output);
    if let Some(audio) = &cli.audio {
        info!("Audio: {:?}", audio);
    }

    // Load configuration
    let config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path).map_err(|e| anyhow::anyhow!(e.user_message()))?
        }
        None => Config::default(),
    };

    let plan = cli.build_plan().context("invalid edit parameters")?;
    info!(
        "Plan: trim={:?} filter={} speed={:.2}x caption={} audio={}",
        plan.trim.map(|r| (r.start, r.end)),
        plan.filter,
        plan.speed,
        plan.overlay.as_ref().map(|o| o.content.as_str()).unwrap_or("-"),
        plan.audio.map(|a| a.volume).map_or("-".to_string(), |v| format!("{v:.2}")),
    );

    let pipeline = EditPipeline::new(config);
    let encoded = pipeline
        .run(
            &cli.input,
            cli.audio.as_deref(),
            &plan,
            &cli.output,
            &CancelToken::new(),
        )
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    info!(
        "Done: {} ({:.2}s, {} frames, {:.1} MB)",
        encoded.path.display(),
        encoded.duration,
        encoded.frame_count,
        encoded.file_size as f64 / 1024.0 / 1024.0
    );
    Ok(())
}

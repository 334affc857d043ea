use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};

use snapgrab::capture::{
    self, CaptureDeps, CaptureManager, CaptureMode, CapturePipeline, CaptureRequest,
    ImageFormat, IntervalCapture, portal,
};
use snapgrab::config::{Config, MAX_DIMENSION, MIN_DIMENSION};
use snapgrab::gallery::{self, GalleryStore, JsonFileStore, MemoryStore, resolve_id};
use snapgrab::selection::{self, SelectionRect};

#[derive(Parser, Debug)]
#[command(name = "snapgrab")]
#[command(about = "Screenshot capture and gallery tool for Linux desktops")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("SNAPGRAB_GIT_HASH"), ")"))]
struct Cli {
    /// Override the gallery blob path
    #[arg(long, global = true, value_name = "FILE")]
    gallery: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Capture the visible frame or a selected region
    Capture(CaptureArgs),

    /// Capture repeatedly on a fixed interval
    Watch(WatchArgs),

    /// Manage stored screenshots
    Gallery {
        #[command(subcommand)]
        command: GalleryCommand,
    },

    /// Show or initialize the configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Args, Debug, Clone)]
struct CaptureArgs {
    /// Select a region interactively before capturing
    #[arg(long, conflicts_with = "rect")]
    region: bool,

    /// Capture a fixed region given as "X,Y WxH"
    #[arg(long, value_name = "GEOM")]
    rect: Option<SelectionRect>,

    /// Output format: png, jpeg or webp
    #[arg(long)]
    format: Option<ImageFormat>,

    /// Quality percent, 10-100 (applies to JPEG; PNG and WebP encode lossless)
    #[arg(long, value_parser = clap::value_parser!(u8).range(10..=100))]
    quality: Option<u8>,

    /// Custom output width in pixels (scales without preserving aspect ratio)
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Custom output height in pixels
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Write the image to a file instead of the gallery
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct WatchArgs {
    /// Seconds between captures
    #[arg(long, value_name = "SECS")]
    interval: Option<u64>,

    /// Stop after this many captures (runs until Ctrl-C otherwise)
    #[arg(long, value_name = "N")]
    count: Option<u64>,

    #[command(flatten)]
    capture: CaptureArgs,
}

#[derive(Subcommand, Debug)]
enum GalleryCommand {
    /// List stored screenshots, newest first
    List,

    /// Rename a screenshot (id may be a unique prefix)
    Rename { id: String, name: String },

    /// Add a tag to a screenshot
    Tag { id: String, tag: String },

    /// Remove a tag from a screenshot
    Untag { id: String, tag: String },

    /// Delete a screenshot
    Delete { id: String },

    /// Delete every screenshot
    Clear {
        /// Skip the confirmation check
        #[arg(long)]
        yes: bool,
    },

    /// Write one screenshot's image to a file
    Save {
        id: String,
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Export every screenshot into a ZIP archive
    Export {
        #[arg(long, value_name = "FILE", default_value = "screenshots.zip")]
        out: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write a default config file
    Init,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let store = open_store(cli.gallery.as_deref(), &config);

    match cli.command {
        Command::Capture(args) => run_capture(args, &config, store),
        Command::Watch(args) => run_watch(args, &config, store),
        Command::Gallery { command } => run_gallery(command, store.as_ref()),
        Command::Config { command } => run_config(command, &config),
    }
}

/// Pick the storage implementation once at startup: the file-backed blob
/// when a path resolves, the in-memory store otherwise.
fn open_store(override_path: Option<&std::path::Path>, config: &Config) -> Arc<dyn GalleryStore> {
    let path = override_path
        .map(PathBuf::from)
        .or_else(|| config.gallery_blob_path());

    match path {
        Some(path) => {
            log::debug!("using gallery blob at {}", path.display());
            Arc::new(JsonFileStore::new(path))
        }
        None => {
            log::warn!("no data directory available, gallery will not persist");
            Arc::new(MemoryStore::new())
        }
    }
}

fn build_request(args: &CaptureArgs, mode: CaptureMode, config: &Config) -> CaptureRequest {
    let format = args.format.unwrap_or_else(|| config.default_format());
    let quality_percent = args.quality.unwrap_or(config.capture.default_quality);

    let target_size = match (args.width, args.height) {
        (Some(w), Some(h)) => Some((w, h)),
        _ => config
            .capture
            .custom_width
            .zip(config.capture.custom_height),
    };
    // Dimension bounds are this layer's responsibility; the pipeline only
    // rejects zero.
    let target_size = target_size.map(|(w, h)| {
        (
            w.clamp(MIN_DIMENSION, MAX_DIMENSION),
            h.clamp(MIN_DIMENSION, MAX_DIMENSION),
        )
    });

    CaptureRequest {
        mode,
        format,
        quality: f32::from(quality_percent) / 100.0,
        target_size,
    }
}

/// Fails early with a readable error when the Screenshot portal is not
/// reachable, instead of a bare D-Bus error mid-capture.
async fn ensure_portal() -> Result<()> {
    if portal::is_portal_available().await {
        Ok(())
    } else {
        bail!("screenshot portal is unavailable; is xdg-desktop-portal running on the session bus?")
    }
}

async fn resolve_mode(args: &CaptureArgs) -> Result<CaptureMode> {
    let rect = if args.region {
        Some(
            selection::slurp::pick_region()
                .await
                .context("region selection failed")?,
        )
    } else {
        args.rect
    };

    match rect {
        Some(rect) if rect.is_empty() => {
            // A zero-area selection resolves rather than cancels; refusing to
            // capture it is this caller's policy.
            bail!("selected region is empty, nothing to capture")
        }
        Some(rect) => Ok(CaptureMode::Region(rect)),
        None => Ok(CaptureMode::FullFrame),
    }
}

fn run_capture(args: CaptureArgs, config: &Config, store: Arc<dyn GalleryStore>) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        ensure_portal().await?;
        let mode = resolve_mode(&args).await?;
        let request = build_request(&args, mode, config);
        let pipeline = CapturePipeline::portal();

        if let Some(out) = &args.out {
            let result = pipeline.capture(&request).await?;
            fs::write(out, &result.data)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!(
                "captured {}x{} {} to {}",
                result.width,
                result.height,
                result.format,
                out.display()
            );
        } else {
            let deps = CaptureDeps {
                pipeline,
                store,
                name_template: config.storage.name_template.clone(),
                notify: config.ui.notifications,
            };
            let shot = capture::perform_capture(&request, &deps).await?;
            println!(
                "captured {} ({}x{} {}) with id {}",
                shot.name, shot.width, shot.height, shot.format, shot.id
            );
        }
        Ok(())
    })
}

fn run_watch(args: WatchArgs, config: &Config, store: Arc<dyn GalleryStore>) -> Result<()> {
    let interval = args.interval.unwrap_or(config.capture.interval_secs);
    if interval == 0 {
        bail!("interval must be at least 1 second");
    }
    if args.capture.out.is_some() {
        bail!("--out only applies to a single capture; watch stores every tick in the gallery");
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        ensure_portal().await?;
        let mode = resolve_mode(&args.capture).await?;
        let request = build_request(&args.capture, mode, config);

        let deps = CaptureDeps {
            pipeline: CapturePipeline::portal(),
            store: store.clone(),
            name_template: config.storage.name_template.clone(),
            notify: config.ui.notifications,
        };
        let manager = CaptureManager::new(&tokio::runtime::Handle::current(), deps);

        let schedule = IntervalCapture::start(
            manager.clone(),
            request,
            Duration::from_secs(interval),
            args.count,
        );

        if args.count.is_some() {
            schedule.join().await;
        } else {
            println!("capturing every {interval}s, press Ctrl-C to stop");
            tokio::signal::ctrl_c()
                .await
                .context("failed to listen for Ctrl-C")?;
            schedule.stop();
            schedule.join().await;
        }

        // Let already-enqueued captures finish before reporting.
        manager.wait_idle().await;
        println!("gallery now holds {} screenshot(s)", store.list()?.len());
        Ok(())
    })
}

fn run_gallery(command: GalleryCommand, store: &dyn GalleryStore) -> Result<()> {
    match command {
        GalleryCommand::List => {
            let records = store.list()?;
            if records.is_empty() {
                println!("gallery is empty");
                return Ok(());
            }
            for shot in records {
                println!(
                    "{}  {}  {:>4}x{:<4}  {:>8}  {}  [{}]",
                    &shot.id.to_string()[..8],
                    shot.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    shot.width,
                    shot.height,
                    format!("{}B", shot.data.len()),
                    shot.name,
                    shot.tags.join(", "),
                );
            }
        }
        GalleryCommand::Rename { id, name } => {
            if name.trim().is_empty() {
                bail!("new name must not be empty");
            }
            let id = resolve_id(store, &id)?;
            store.rename(id, &name)?;
            println!("renamed {id} to '{}'", name.trim());
        }
        GalleryCommand::Tag { id, tag } => {
            let id = resolve_id(store, &id)?;
            store.add_tag(id, &tag)?;
            println!("tagged {id} with '{}'", tag.trim());
        }
        GalleryCommand::Untag { id, tag } => {
            let id = resolve_id(store, &id)?;
            store.remove_tag(id, &tag)?;
            println!("removed tag '{tag}' from {id}");
        }
        GalleryCommand::Delete { id } => {
            let id = resolve_id(store, &id)?;
            store.delete(id)?;
            println!("deleted {id}");
        }
        GalleryCommand::Clear { yes } => {
            if !yes {
                bail!("refusing to clear the gallery without --yes");
            }
            store.clear()?;
            println!("gallery cleared");
        }
        GalleryCommand::Save { id, out } => {
            let id = resolve_id(store, &id)?;
            let shot = store.get(id)?;
            let out = out.unwrap_or_else(|| PathBuf::from(shot.file_name()));
            gallery::export::save_record(&shot, &out)?;
            println!("saved {} to {}", shot.name, out.display());
        }
        GalleryCommand::Export { out } => {
            let records = store.list()?;
            let count = gallery::export::export_zip(&records, &out)?;
            println!("exported {count} screenshot(s) to {}", out.display());
        }
    }
    Ok(())
}

fn run_config(command: ConfigCommand, config: &Config) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            print!("{}", toml::to_string_pretty(config)?);
        }
        ConfigCommand::Init => {
            let path = Config::config_path()?;
            if path.exists() {
                bail!("config file already exists at {}", path.display());
            }
            Config::default().save()?;
            println!("wrote default config to {}", path.display());
        }
    }
    Ok(())
}

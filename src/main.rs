use clap::{Parser, Subcommand};
use shotframe::config::{self, StudioConfig};
use shotframe::devices::{Platform, resolve_chassis_color};
use shotframe::export::{self, ExportManifest, ManifestEntry};
use shotframe::imaging::{ImageBackend, RustBackend, establish_master};
use shotframe::session::{EditState, EditingSession, ExportTray};
use shotframe::types::{CropArea, ExportMode, FitMode};
use shotframe::{capture::CaptureEvent, output, scan};
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let version = env!("CARGO_PKG_VERSION");
    let describe = env!("SHOTFRAME_GIT_DESCRIBE");
    if describe.is_empty() || describe.trim_start_matches('v') == version {
        version
    } else {
        // Leaked once at startup
        Box::leak(format!("{version} (dev@{describe})").into_boxed_str())
    }
}

#[derive(Parser)]
#[command(name = "shotframe")]
#[command(about = "Turn one app screenshot into store-ready images for every device size")]
#[command(long_about = "\
Turn one app screenshot into store-ready images for every device size

Each screenshot is normalized once (status bar and home-indicator bands are
trimmed, Apple captures get a small symmetric inset), then rendered for every
device of the chosen ecosystem:

  apple     iPhone 6.7\", iPhone 6.5\", iPad 12.9\"
  android   phone, 7\" tablet, 10\" tablet, Chromebook

Output files follow {platform}_{device}_{size}_{mode}_{index}.png, e.g.

  store/
  ├── apple_phone_6.7_rect_01.png
  ├── apple_phone_6.5_rect_01.png
  ├── apple_tablet_12.9_rect_01.png
  └── export-manifest.json

Run 'shotframe gen-config' to generate a documented shotframe.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (default: ./shotframe.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log render details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Shared flags for commands that render.
#[derive(clap::Args, Clone)]
struct RenderArgs {
    /// Store ecosystem: apple | android
    #[arg(long, value_parser = parse_platform)]
    platform: Option<Platform>,

    /// Composition: rectangle | frame
    #[arg(long, value_parser = parse_mode)]
    mode: Option<ExportMode>,

    /// Aspect policy: fit | autofit | stretch
    #[arg(long, value_parser = parse_fit)]
    fit: Option<FitMode>,

    /// Crop of the normalized screenshot as x,y,width,height percentages
    #[arg(long, value_parser = parse_crop)]
    crop: Option<CropArea>,

    /// Brightness percentage (100 = unchanged)
    #[arg(long)]
    brightness: Option<f64>,

    /// Contrast percentage (100 = unchanged)
    #[arg(long)]
    contrast: Option<f64>,

    /// Saturation percentage (100 = unchanged)
    #[arg(long)]
    saturation: Option<f64>,

    /// Sharpening strength 0-100
    #[arg(long)]
    sharpness: Option<f64>,

    /// Chassis swatch name or #rrggbb (frame mode)
    #[arg(long)]
    chassis: Option<String>,

    /// Output directory
    #[arg(short, long, default_value = "store")]
    output: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// List device specs and chassis swatches
    Devices {
        /// Only this ecosystem
        #[arg(long, value_parser = parse_platform)]
        platform: Option<Platform>,
    },
    /// Show what normalization detects and crops for a screenshot
    Detect {
        image: PathBuf,
        #[arg(long, value_parser = parse_platform)]
        platform: Option<Platform>,
    },
    /// Render screenshots for every device of an ecosystem
    Export {
        #[arg(required = true)]
        images: Vec<PathBuf>,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// Render every screenshot found under a directory
    Batch {
        dir: PathBuf,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// Check exported files against the directory's manifest
    Verify {
        /// Export directory
        #[arg(default_value = "store")]
        dir: PathBuf,
    },
    /// Print a stock shotframe.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config(Path::new("."))?,
    };

    match cli.command {
        Command::Devices { platform } => output::print_devices(platform),
        Command::Detect { image, platform } => {
            let platform = platform.unwrap_or(config.defaults.platform);
            let backend = RustBackend::new();
            let source = backend.decode(&std::fs::read(&image)?)?;
            let normalized = establish_master(source, platform);
            let master = &normalized.master;
            output::print_detect_report(&image, &normalized.report, (master.width(), master.height()));
        }
        Command::Export { images, render } => {
            run_export(&images, &render, config)?;
        }
        Command::Batch { dir, render } => {
            let images = scan::find_screenshots(&dir, Some(&render.output))?;
            if images.is_empty() {
                return Err(format!("no screenshots found in {}", dir.display()).into());
            }
            run_export(&images, &render, config)?;
        }
        Command::Verify { dir } => {
            let manifest = ExportManifest::load(&dir)?;
            let mismatched = manifest.verify(&dir);
            output::print_verify_report(&dir, manifest.items.len(), &mismatched);
            if !mismatched.is_empty() {
                return Err(format!(
                    "{} exported files do not match the manifest",
                    mismatched.len()
                )
                .into());
            }
        }
        Command::GenConfig => {}
    }

    Ok(())
}

/// Capture every source, then write the tray to the output directory.
fn run_export(
    sources: &[PathBuf],
    args: &RenderArgs,
    mut config: StudioConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let platform = args.platform.unwrap_or(config.defaults.platform);
    apply_overrides(&mut config, args, platform)?;
    config.validate()?;
    init_thread_pool(&config.processing);

    let edit = config.edit_state(platform);
    let backend = RustBackend::new();
    let mut tray = ExportTray::new();
    let mut captured: Vec<(&Path, usize)> = Vec::new();
    let mut failed = 0;

    for source in sources {
        match capture_file(&backend, source, platform, edit, args.crop) {
            Ok(event) => {
                let ids = tray.commit(event);
                captured.push((source.as_path(), ids.len()));
            }
            Err(e) => {
                eprintln!("{}: {}", source.display(), e);
                failed += 1;
            }
        }
    }
    tracing::debug!(?edit, items = tray.len(), "captures committed");

    if tray.is_empty() {
        return Err("no screenshots could be rendered".into());
    }

    let manifest = export::export_items(tray.iter(), &args.output)?;
    let mut entries = manifest.items.iter();
    for (source, count) in captured {
        let group: Vec<&ManifestEntry> = entries.by_ref().take(count).collect();
        output::print_capture_output(source, &group);
    }
    output::print_export_summary(manifest.items.len(), &args.output, failed);
    if failed > 0 {
        return Err(format!("{failed} of {} screenshots failed to render", sources.len()).into());
    }
    Ok(())
}

fn capture_file(
    backend: &RustBackend,
    source: &Path,
    platform: Platform,
    edit: EditState,
    crop: Option<CropArea>,
) -> Result<CaptureEvent, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(source)?;
    let mut session = EditingSession::open(backend, &bytes, platform, edit)?;
    if session.report().fell_back {
        tracing::warn!(source = %source.display(), "using unnormalized upload");
    }
    if let Some(crop) = crop {
        session.set_crop(crop)?;
    }
    Ok(session.capture(backend)?)
}

/// Fold command-line flags over the loaded config.
fn apply_overrides(
    config: &mut StudioConfig,
    args: &RenderArgs,
    platform: Platform,
) -> Result<(), String> {
    if let Some(mode) = args.mode {
        config.defaults.mode = mode;
    }
    if let Some(fit) = args.fit {
        config.defaults.fit = fit;
    }
    let adj = &mut config.adjustments;
    adj.brightness = args.brightness.unwrap_or(adj.brightness);
    adj.contrast = args.contrast.unwrap_or(adj.contrast);
    adj.saturation = args.saturation.unwrap_or(adj.saturation);
    adj.sharpness = args.sharpness.unwrap_or(adj.sharpness);
    if let Some(value) = &args.chassis {
        let color = resolve_chassis_color(platform, value)
            .ok_or_else(|| format!("unknown chassis color '{value}' for {platform}"))?;
        match platform {
            Platform::Apple => config.chassis.apple = color,
            Platform::Android => config.chassis.android = color,
        }
    }
    Ok(())
}

/// Install the stderr log subscriber. `--verbose` shows render details.
fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn parse_platform(s: &str) -> Result<Platform, String> {
    Platform::ALL
        .into_iter()
        .find(|p| p.as_str().eq_ignore_ascii_case(s))
        .ok_or_else(|| format!("expected apple or android, got '{s}'"))
}

fn parse_mode(s: &str) -> Result<ExportMode, String> {
    [ExportMode::Rectangle, ExportMode::Frame]
        .into_iter()
        .find(|m| m.as_str().eq_ignore_ascii_case(s) || m.filename_tag().eq_ignore_ascii_case(s))
        .ok_or_else(|| format!("expected rectangle or frame, got '{s}'"))
}

fn parse_fit(s: &str) -> Result<FitMode, String> {
    [FitMode::Fit, FitMode::Autofit, FitMode::Stretch]
        .into_iter()
        .find(|f| f.as_str().eq_ignore_ascii_case(s))
        .ok_or_else(|| format!("expected fit, autofit or stretch, got '{s}'"))
}

fn parse_crop(s: &str) -> Result<CropArea, String> {
    let values: Vec<f64> = s
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("crop values must be numbers: {e}"))?;
    match values.as_slice() {
        [x, y, w, h] => CropArea::new(*x, *y, *w, *h).map_err(|e| e.to_string()),
        _ => Err(format!("expected x,y,width,height, got '{s}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    fn render_args(platform: Platform, output: PathBuf) -> RenderArgs {
        RenderArgs {
            platform: Some(platform),
            mode: None,
            fit: None,
            crop: None,
            brightness: None,
            contrast: None,
            saturation: None,
            sharpness: None,
            chassis: None,
            output,
        }
    }

    #[test]
    fn export_with_a_failed_source_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let good = tmp.path().join("home.png");
        let shot = RgbaImage::from_fn(90, 160, |x, y| Rgba([(x * 2) as u8, y as u8, 120, 255]));
        std::fs::write(&good, RustBackend::new().encode_png(&shot).unwrap()).unwrap();
        let broken = tmp.path().join("broken.png");
        std::fs::write(&broken, b"not an image").unwrap();

        let out = tmp.path().join("store");
        let args = render_args(Platform::Android, out.clone());
        let err = run_export(&[good, broken], &args, StudioConfig::default()).unwrap_err();
        assert!(err.to_string().contains("1 of 2"), "{err}");

        // The good source is still exported
        let manifest = ExportManifest::load(&out).unwrap();
        assert_eq!(manifest.items.len(), 4);
        assert!(manifest.verify(&out).is_empty());
    }

    #[test]
    fn parse_crop_requires_four_values() {
        assert!(parse_crop("0,0,100,100").is_ok());
        assert!(parse_crop("0,0,100").is_err());
        assert!(parse_crop("a,0,100,100").is_err());
    }

    #[test]
    fn parse_mode_accepts_filename_tags() {
        assert_eq!(parse_mode("mockup").unwrap(), ExportMode::Frame);
        assert_eq!(parse_mode("RECTANGLE").unwrap(), ExportMode::Rectangle);
    }
}

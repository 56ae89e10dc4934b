use clap::{Parser, Subcommand};
use exif_frame::batch::{self, BatchOptions};
use exif_frame::config::{self, FrameConfig};
use exif_frame::imaging::{self, FontSet, FrameJob, LogoSource, RenderWarning, RustBackend};
use exif_frame::types::{Color, TemplateStyle};
use exif_frame::{logos, naming, output};
use std::path::{Path, PathBuf};

/// Flags shared by every command that renders a frame. Each one overrides
/// the matching config value.
#[derive(clap::Args, Clone)]
struct StyleArgs {
    /// Frame template: full_frame, bottom_only or classic
    #[arg(long)]
    style: Option<TemplateStyle>,

    /// Text colour as #rrggbb or r,g,b
    #[arg(long)]
    text_color: Option<Color>,

    /// Border divisor: border = min(width, height) / ratio
    #[arg(long)]
    border_ratio: Option<f64>,

    /// Band divisor: band = height / ratio
    #[arg(long)]
    bottom_ratio: Option<f64>,

    /// Font divisor: font size = band / ratio
    #[arg(long)]
    font_ratio: Option<f64>,

    /// Logo divisor: logo height = band / ratio
    #[arg(long)]
    logo_ratio: Option<f64>,

    /// Padding divisor: margin = band / ratio
    #[arg(long)]
    padding_ratio: Option<f64>,

    /// JPEG quality (1-100)
    #[arg(long)]
    quality: Option<u32>,

    /// PNG logo drawn in the band
    #[arg(long, conflicts_with = "logo_dir")]
    logo: Option<PathBuf>,

    /// Directory of brand logos; the one matching the camera make is used
    #[arg(long)]
    logo_dir: Option<PathBuf>,

    /// One line per image, no parameters or warnings
    #[arg(short, long)]
    quiet: bool,
}

impl StyleArgs {
    /// Apply the flags on top of `config` and re-validate.
    fn apply(&self, mut config: FrameConfig) -> Result<FrameConfig, config::ConfigError> {
        if let Some(style) = self.style {
            config.style = style;
        }
        if let Some(color) = self.text_color {
            config.text_color = color;
        }
        let ratios = &mut config.ratios;
        for (flag, target) in [
            (self.border_ratio, &mut ratios.border_ratio),
            (self.bottom_ratio, &mut ratios.bottom_ratio),
            (self.font_ratio, &mut ratios.font_ratio),
            (self.logo_ratio, &mut ratios.logo_ratio),
            (self.padding_ratio, &mut ratios.padding_ratio),
        ] {
            if let Some(value) = flag {
                *target = value;
            }
        }
        if let Some(quality) = self.quality {
            config.output.quality = quality;
        }
        config.validate()?;
        Ok(config)
    }

    fn logo_source(&self) -> LogoSource {
        match (&self.logo, &self.logo_dir) {
            (Some(file), _) => LogoSource::File(file.clone()),
            (None, Some(dir)) => LogoSource::Directory(dir.clone()),
            (None, None) => LogoSource::None,
        }
    }
}

#[derive(Parser)]
#[command(name = "exif-frame")]
#[command(about = "Frame photographs with their EXIF shooting parameters")]
#[command(long_about = "\
Frame photographs with their EXIF shooting parameters

Reads camera, lens and exposure data from each image and draws it in a
band below the photo, sized in proportion to the image.

Styles:

  bottom_only   image edges untouched, text band below (default)
  full_frame    uniform border on three sides plus the band
  classic       band split into two columns by a vertical rule:
                exposure on the left, camera and lens on the right

  ┌──────────────────────────┐
  │                          │
  │          photo           │
  │                          │
  ├──────────────────────────┤
  │ FUJIFILM X-T5    [logo]  │
  │ 23.0mm f/2.8 1/125s      │
  └──────────────────────────┘

Settings are read from exif-frame.toml in the working directory, or from
--config. Command-line flags override the file.

Run 'exif-frame gen-config' to generate a documented exif-frame.toml.")]
#[command(version = env!("EXIF_FRAME_VERSION"))]
struct Cli {
    /// Config file (default: ./exif-frame.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Frame one image
    Frame {
        image: PathBuf,
        /// Output path (default: <stem>_watermarked.<ext> beside the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// Frame every supported image under a directory
    Batch {
        dir: PathBuf,
        /// Where framed images are written, mirroring the input tree
        #[arg(long)]
        output_dir: PathBuf,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// Render a frame downscaled to fit a preview box
    Preview {
        image: PathBuf,
        /// Output path (default: <stem>_preview.<ext> beside the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = 800)]
        max_width: u32,
        #[arg(long, default_value_t = 600)]
        max_height: u32,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// Print the normalized shooting parameters of an image as JSON
    Exif { image: PathBuf },
    /// List the PNG logos in a directory
    Logos { dir: PathBuf },
    /// Print a stock exif-frame.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let base = || -> Result<FrameConfig, config::ConfigError> {
        config::load_config(cli.config.as_deref(), Path::new("."))
    };
    let backend = RustBackend::new();

    match cli.command {
        Command::Frame {
            ref image,
            output: ref out,
            ref style,
        } => {
            let config = style.apply(base()?)?;
            let (fonts, font_warnings) = load_fonts(&config)?;
            let out = out
                .clone()
                .unwrap_or_else(|| naming::default_output_path(image, &config.output.suffix));
            let job = frame_job(&config, style, image, out);
            let mut report = imaging::frame_file(&backend, &job, &fonts)?;
            report.warnings.extend(font_warnings);
            output::print_frame_report(&report, style.quiet);
        }
        Command::Batch {
            ref dir,
            ref output_dir,
            ref style,
        } => {
            let config = style.apply(base()?)?;
            let (fonts, font_warnings) = load_fonts(&config)?;
            if !style.quiet {
                for line in output::format_warnings(&font_warnings) {
                    println!("{line}");
                }
            }
            init_thread_pool(&config.processing);
            let options = BatchOptions {
                input_root: dir.clone(),
                output_root: output_dir.clone(),
                suffix: config.output.suffix.clone(),
                logo: style.logo_source(),
                request: config.request(),
                metadata: config.metadata.clone(),
                quality: config.quality(),
            };
            let (tx, rx) = std::sync::mpsc::channel();
            let quiet = style.quiet;
            let printer = std::thread::spawn(move || {
                let mut total = 0;
                let mut done = 0;
                for event in rx {
                    match &event {
                        batch::BatchEvent::Started { total: t } => total = *t,
                        _ => done += 1,
                    }
                    if !quiet {
                        println!("{}", output::format_batch_event(&event, done, total));
                    }
                }
            });
            let summary = batch::run_batch(&backend, &fonts, &options, Some(tx))?;
            printer.join().ok();
            output::print_batch_summary(&summary);
            if !summary.is_success() {
                return Err(format!("{} image(s) failed", summary.failed_count()).into());
            }
        }
        Command::Preview {
            ref image,
            output: ref out,
            max_width,
            max_height,
            ref style,
        } => {
            let config = style.apply(base()?)?;
            let (fonts, font_warnings) = load_fonts(&config)?;
            let out = out
                .clone()
                .unwrap_or_else(|| naming::preview_output_path(image));
            let job = frame_job(&config, style, image, out.clone());
            let mut report =
                imaging::preview_file(&backend, &job, &fonts, (max_width, max_height), &out)?;
            report.warnings.extend(font_warnings);
            output::print_frame_report(&report, style.quiet);
        }
        Command::Exif { ref image } => {
            let config = base()?;
            let report = imaging::describe_file(&backend, image, &config.metadata)?;
            for issue in &report.issues {
                log::warn!("{}: {} ({})", image.display(), issue.field, issue.error);
            }
            println!("{}", output::format_parameters_json(&report.params)?);
        }
        Command::Logos { ref dir } => {
            output::print_logos(dir, &logos::list_logos(dir));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn frame_job(config: &FrameConfig, style: &StyleArgs, image: &Path, output: PathBuf) -> FrameJob {
    FrameJob {
        source: image.to_path_buf(),
        output,
        logo: style.logo_source(),
        request: config.request(),
        metadata: config.metadata.clone(),
        quality: config.quality(),
    }
}

fn load_fonts(config: &FrameConfig) -> Result<(FontSet, Vec<RenderWarning>), imaging::FontError> {
    FontSet::load(config.fonts.regular.as_deref(), config.fonts.bold.as_deref())
}

/// `info` by default, `debug` under `--verbose`; `RUST_LOG` wins over both.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

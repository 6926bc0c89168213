use clap::{Parser, Subcommand};
use image_boxer::imaging::{FitMode, Quality, plan_mosaic};
use image_boxer::naming::DEFAULT_MOSAIC_NAME;
use image_boxer::process::ProcessEvent;
use image_boxer::ratio::{AspectRatio, PRESETS, parse_ratio};
use image_boxer::{config, output, process, scan};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

/// Input paths shared by every command that reads images.
#[derive(clap::Args, Clone)]
struct InputArgs {
    /// Image files and/or directories, in cell order
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Descend into sub-directories of directory inputs
    #[arg(short, long)]
    recursive: bool,
}

/// Ratio and fit flags; unset values fall back to the config.
#[derive(clap::Args, Clone)]
struct FitArgs {
    /// Target aspect ratio as W:H, e.g. 16:9
    #[arg(long, value_parser = parse_ratio)]
    ratio: Option<AspectRatio>,

    /// Crop images that don't match their cell
    #[arg(long, conflicts_with = "pad")]
    crop: bool,

    /// Pad images that don't match their cell with black borders
    #[arg(long)]
    pad: bool,
}

impl FitArgs {
    fn fit_or(&self, configured: FitMode) -> FitMode {
        if self.crop {
            FitMode::Crop
        } else if self.pad {
            FitMode::Pad
        } else {
            configured
        }
    }
}

#[derive(Parser)]
#[command(name = "image-boxer")]
#[command(about = "Fit images to an aspect ratio, alone or as a mosaic")]
#[command(long_about = "\
Fit images to an aspect ratio, alone or as a mosaic

The mosaic grid has ceil(sqrt(n)) columns and as many rows as needed. Every
cell gets the ratio that makes the whole canvas match the target, and each
image is cropped or padded (centred) to that cell ratio before it is scaled.

Directory inputs are expanded in NNN- prefix order, then by name:

  photos/
  ├── 001-first.jpg      # cell 1
  ├── 002-second.png     # cell 2
  └── zebra.jpg          # unnumbered files follow, by name

Settings are read from ./boxer.toml (or --config FILE); flags override them.
Run 'image-boxer gen-config' to generate a documented boxer.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./boxer.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compose all inputs into one mosaic
    Mosaic {
        #[command(flatten)]
        input: InputArgs,

        /// Output file; the extension picks the format
        #[arg(short, long, default_value = DEFAULT_MOSAIC_NAME)]
        output: PathBuf,

        #[command(flatten)]
        fit: FitArgs,

        /// Pixel height of each grid cell
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        cell_height: Option<u32>,

        /// JPEG quality (1-100)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
        quality: Option<u32>,
    },
    /// Crop or pad every input to the ratio and save it separately
    Box {
        #[command(flatten)]
        input: InputArgs,

        /// Directory for the boxed copies
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,

        #[command(flatten)]
        fit: FitArgs,

        /// JPEG quality (1-100)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
        quality: Option<u32>,
    },
    /// Show the grid and canvas geometry for a number of images
    Plan {
        /// Number of images
        count: usize,

        /// Target aspect ratio as W:H, e.g. 16:9
        #[arg(long, value_parser = parse_ratio)]
        ratio: Option<AspectRatio>,

        /// Pixel height of each grid cell
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        cell_height: Option<u32>,
    },
    /// List the preset aspect ratios
    Ratios,
    /// List collected inputs with their dimensions, without writing anything
    Check {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Print a stock boxer.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Mosaic {
            input,
            output: output_path,
            fit,
            cell_height,
            quality,
        } => {
            let config = load_config(cli.config.as_deref())?;
            init_thread_pool(&config.processing);
            let set = collect(&input, &config, cli.json)?;

            let mut options = process::MosaicOptions::from_config(&config)?;
            if let Some(ratio) = fit.ratio {
                options.params.target_ratio = ratio;
            }
            options.params.fit = fit.fit_or(options.params.fit);
            if let Some(height) = cell_height {
                options.params.cell_height = height;
            }
            if let Some(q) = quality {
                options.quality = Quality::new(q);
            }

            let report = with_progress(!cli.json, |events| {
                process::build_mosaic(&set.images, &output_path, &options, events)
            })?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_mosaic_report(&report);
            }
        }
        Command::Box {
            input,
            output_dir,
            fit,
            quality,
        } => {
            let config = load_config(cli.config.as_deref())?;
            init_thread_pool(&config.processing);
            let set = collect(&input, &config, cli.json)?;

            let mut options = process::BoxOptions::from_config(&config)?;
            if let Some(ratio) = fit.ratio {
                options.target_ratio = ratio;
            }
            options.fit = fit.fit_or(options.fit);
            if let Some(q) = quality {
                options.quality = Quality::new(q);
            }

            let report = with_progress(!cli.json, |events| {
                process::box_images(&set.images, &output_dir, &options, events)
            })?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_box_report(&report);
            }
            if !report.is_complete() {
                return Err(format!("{} of the inputs could not be boxed", report.failed.len()).into());
            }
        }
        Command::Plan {
            count,
            ratio,
            cell_height,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let mut params = config.mosaic_params()?;
            if let Some(ratio) = ratio {
                params.target_ratio = ratio;
            }
            if let Some(height) = cell_height {
                params.cell_height = height;
            }
            let plan = plan_mosaic(count, &params)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                output::print_plan(&plan);
            }
        }
        Command::Ratios => {
            if cli.json {
                let presets: Vec<_> = PRESETS
                    .iter()
                    .map(|p| {
                        serde_json::json!({
                            "label": p.label,
                            "ratio": p.text,
                            "value": p.ratio().value(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&presets)?);
            } else {
                output::print_presets(PRESETS);
            }
        }
        Command::Check { input } => {
            let config = load_config(cli.config.as_deref())?;
            init_thread_pool(&config.processing);
            let set = scan::collect_inputs(&input.inputs, input.recursive || config.input.recursive)?;
            let checked = process::check_inputs(&set.images);
            if cli.json {
                let body = serde_json::json!({
                    "inputs": checked,
                    "skipped": set.skipped,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                output::print_check_output(&set, &checked);
            }
            if checked.iter().any(|c| c.dimensions.is_err()) {
                return Err("some inputs could not be read".into());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the explicit config file, or `./boxer.toml` when none was given.
fn load_config(path: Option<&Path>) -> Result<config::BoxerConfig, config::ConfigError> {
    match path {
        Some(file) => config::load_config_file(file),
        None => config::load_config(Path::new(".")),
    }
}

/// Collect inputs and report what was found (text mode only). Having nothing
/// to process is an error.
fn collect(
    input: &InputArgs,
    config: &config::BoxerConfig,
    quiet: bool,
) -> Result<scan::InputSet, scan::ScanError> {
    let set = scan::collect_inputs(&input.inputs, input.recursive || config.input.recursive)?
        .require_images()?;
    if !quiet {
        println!("{}", output::format_input_summary(&set));
        for line in output::format_skipped(&set.skipped) {
            println!("{}", line);
        }
    }
    Ok(set)
}

/// Run a pipeline with a printer thread draining its progress events.
fn with_progress<T>(enabled: bool, run: impl FnOnce(Option<Sender<ProcessEvent>>) -> T) -> T {
    if !enabled {
        return run(None);
    }
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_process_event(&event) {
                println!("{}", line);
            }
        }
    });
    // The sender is consumed by `run`, so the printer ends when it returns
    let result = run(Some(tx));
    printer.join().ok();
    result
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

use clap::{Parser, Subcommand};
use image_wrangler::config::{self, CONFIG_FILE_NAME};
use image_wrangler::dimensions::Dimensions;
use image_wrangler::image::Image;
use image_wrangler::magick::ImageMagick;
use image_wrangler::output;
use image_wrangler::scaling::ScaleTarget;
use image_wrangler::transform::{RenderConfig, TransformOptions, Transformer};
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser)]
#[command(name = "image-wrangler")]
#[command(about = "Validated, ordered ImageMagick render pipelines")]
#[command(long_about = "\
Validated, ordered ImageMagick render pipelines

Describe each derivative file as a JSON object of convert options. Option
names are checked against the installed ImageMagick and emitted in the
order convert expects: settings, then operators, then sequence operators.

Component file (JSON array, one object per derivative):

  [
    { \"filepath\": \"thumb.jpg\",
      \"options\": { \"thumbnail\": \"240x240\", \"strip\": null } },
    { \"filename\": \"web.jpg\",
      \"read_options\": { \"density\": \"300\" },
      \"options\": { \"colorspace\": \"sRGB\", \"+profile\": [\"8BIMTEXT\", \"IPTC\"] } }
  ]

  null or true   bare flag (-strip)
  string/number  one argument (-thumbnail 240x240)
  array          repeated option (+profile 8BIMTEXT +profile IPTC)

Run 'image-wrangler gen-config' to generate a documented image-wrangler.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = CONFIG_FILE_NAME, global = true)]
    config: PathBuf,

    /// Log tool invocations and other debug detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show format, dimensions, size, and checksum of an image
    Inspect { file: PathBuf },
    /// Render every component in a JSON file from one source image
    Transform {
        source: PathBuf,
        /// JSON file holding an array of render configs
        #[arg(long)]
        components: PathBuf,
        /// Each component reads the previous component's output
        #[arg(long)]
        cascade: bool,
        /// Render components concurrently (ignored with --cascade)
        #[arg(long)]
        parallel: bool,
    },
    /// Write a copy scaled down to about N pixels
    Downscale {
        source: PathBuf,
        /// Target pixel area
        #[arg(long)]
        area: u64,
        #[arg(long)]
        output: PathBuf,
    },
    /// Compute scaled dimensions without touching any file
    Scale {
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        /// Target pixel area
        #[arg(long, conflicts_with = "fixed_side", required_unless_present = "fixed_side")]
        area: Option<u64>,
        /// Target length of the longer side
        #[arg(long)]
        fixed_side: Option<u32>,
    },
    /// List the convert options the installed ImageMagick recognizes
    Options,
    /// Print a stock image-wrangler.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Inspect { file } => {
            let tool = load_tool(&cli.config)?;
            let image = Image::open(&tool, &file);
            output::print_inspection(&image);
            if !image.is_valid() {
                return Err(format!("cannot inspect {}", file.display()).into());
            }
        }
        Command::Transform {
            source,
            components,
            cascade,
            parallel,
        } => {
            let settings = config::load_config(&cli.config)?;
            let tool = ImageMagick::from_config(&settings.tools);
            let catalog = tool.option_catalog()?;
            let configs = read_components(&components)?;
            let requested = configs.len();

            let mut options = TransformOptions::from(&settings.transform);
            options.cascade |= cascade;
            options.parallel |= parallel;

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let mut transformer = Transformer::new(&tool, catalog, &source, configs, options);
            let processed = transformer.process(Some(&tx));
            drop(tx);
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;

            output::print_transform_summary(
                requested,
                transformer.variants(),
                transformer.errors(),
            );
            if !processed {
                return Err(format!("transform of {} failed", source.display()).into());
            }
        }
        Command::Downscale {
            source,
            area,
            output: target,
        } => {
            let tool = load_tool(&cli.config)?;
            let catalog = tool.option_catalog()?;
            let mut image = Image::open(&tool, &source);
            if image.downscale_to_pixel_area(&tool, catalog, area, &target) {
                output::print_inspection(&Image::open(&tool, &target));
            } else {
                for line in output::format_errors(image.errors()) {
                    println!("{}", line);
                }
                return Err(format!("cannot downscale {}", source.display()).into());
            }
        }
        Command::Scale {
            width,
            height,
            area,
            fixed_side,
        } => {
            let current = Dimensions::new(width, height);
            let target = match (area, fixed_side) {
                (Some(area), _) => ScaleTarget::PixelArea(area),
                (None, Some(side)) => ScaleTarget::FixedSide(side),
                (None, None) => return Err("one of --area or --fixed-side is required".into()),
            };
            for line in output::format_scale(current, target.dimensions(current)) {
                println!("{}", line);
            }
        }
        Command::Options => {
            let tool = load_tool(&cli.config)?;
            output::print_catalog(tool.option_catalog()?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the stderr log subscriber. `-v` raises the level to debug.
fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_tool(config_path: &Path) -> Result<ImageMagick, config::ConfigError> {
    let settings = config::load_config(config_path)?;
    Ok(ImageMagick::from_config(&settings.tools))
}

fn read_components(path: &Path) -> Result<Vec<RenderConfig>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let configs: Vec<RenderConfig> = serde_json::from_str(&content)?;
    Ok(configs)
}

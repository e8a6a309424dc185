use clap::{Parser, Subcommand};
use contact_sheet::export::ExportKind;
use contact_sheet::formats::Catalog;
use contact_sheet::metadata::MetadataInfo;
use contact_sheet::session::{self, Session};
use contact_sheet::{config, layout, output};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// Footer text given on the command line. Non-empty values override `--info`.
#[derive(clap::Args, Clone, Default)]
struct MetadataArgs {
    /// TOML file with date, location, developer, camera, lens and film keys
    #[arg(long)]
    info: Option<PathBuf>,
    #[arg(long)]
    date: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    developer: Option<String>,
    #[arg(long)]
    camera: Option<String>,
    #[arg(long)]
    lens: Option<String>,
    #[arg(long)]
    film: Option<String>,
}

impl MetadataArgs {
    fn overrides(&self) -> MetadataInfo {
        MetadataInfo {
            date: self.date.clone(),
            location: self.location.clone(),
            developer: self.developer.clone(),
            camera: self.camera.clone(),
            lens: self.lens.clone(),
            film: self.film.clone(),
        }
    }
}

#[derive(Parser)]
#[command(name = "contact-sheet")]
#[command(about = "Print-ready contact sheets from scanned film")]
#[command(long_about = "\
Print-ready contact sheets from scanned film

Scans are numbered in file-name order and laid out in a grid sized for the
chosen film format, on a 4:5 page no larger than A4 at 300 dpi. A footer band
below the grid carries the roll details:

  Date: 2024-05-12                 Camera: Nikon FM2
  Location: Lisbon                 Lens: 50mm f/1.8
  Developer: HC-110 B
                     Film: Tri-X 400

Empty fields are left out. The film line is dropped if it does not fit.

Run 'contact-sheet formats' to list film formats and
'contact-sheet gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Config file (TOML). Values not set fall back to the stock defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log layout and export details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a contact sheet and write it to a file
    Render {
        /// Image files or directories of images
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Film format id or name (see `formats`)
        #[arg(short, long, default_value = "35mm-full")]
        format: String,
        /// Output file; the extension picks the type unless --kind is given
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, value_enum)]
        kind: Option<ExportKind>,
        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,
        #[command(flatten)]
        metadata: MetadataArgs,
    },
    /// Show the layout for a number of images without reading any
    Plan {
        #[arg(short, long, default_value = "35mm-full")]
        format: String,
        #[arg(short, long)]
        count: u32,
        /// Print the layout as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the supported film formats
    Formats {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Render {
            inputs,
            format,
            output: out_path,
            kind,
            recursive,
            metadata,
        } => {
            let sheet_config = config::load_config(cli.config.as_deref())?;
            init_thread_pool(&sheet_config.processing);

            let mut roll = Session::new(sheet_config);
            roll.set_format(&format)?;
            let files = session::collect_inputs(&inputs, recursive)?;
            if files.is_empty() {
                tracing::warn!("no supported images found; rendering an empty sheet");
            }
            roll.add_images(files);
            roll.load_metadata(metadata.info.as_deref(), &metadata.overrides())?;

            roll.render()?;
            let kind = roll.export(&out_path, kind)?;
            if let Some(sheet) = roll.sheet() {
                output::print_render_output(roll.images(), sheet, &out_path, kind);
            }
        }
        Command::Plan {
            format,
            count,
            json,
        } => {
            let sheet_config = config::load_config(cli.config.as_deref())?;
            let catalog = Catalog::standard();
            let spec = catalog.get(&format)?;
            let geometry = layout::Geometry::from_config(&sheet_config);
            let sheet_layout = layout::compute_layout(count, spec, &geometry);
            if json {
                println!("{}", serde_json::to_string_pretty(&sheet_layout)?);
            } else {
                output::print_plan_output(spec, &sheet_layout, geometry.dpi);
            }
        }
        Command::Formats { json } => {
            let catalog = Catalog::standard();
            if json {
                let formats: Vec<_> = catalog.iter().collect();
                println!("{}", serde_json::to_string_pretty(&formats)?);
            } else {
                output::print_formats_table(&catalog);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Diagnostics go to stderr so stdout stays clean for command output.
fn init_tracing(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: the config can lower it, not raise it.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

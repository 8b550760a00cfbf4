use chrono::Datelike;
use clap::{ArgAction, Parser, Subcommand};
use microsite::config::{self, Config};
use microsite::editor::{ImageSlot, ScalarField, TilePatch};
use microsite::html::{self, MediaCollector};
use microsite::output;
use microsite::publish::{PublishError, Publisher};
use microsite::render::{RandomChooser, RenderContext, Variant, render};
use microsite::types::{ContentRecord, ImageRef, Tile, TileId, TransientImage};
use microsite::upload::Uploader;
use microsite::validate::{Gate, validate};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "microsite")]
#[command(about = "Build benefits-enrollment microsites from employer data sheets")]
#[command(long_about = "\
Build benefits-enrollment microsites from employer data sheets

The data sheet's first row holds everything about one employer. Columns are
matched by exact name:

  Company Name, Employer Logo, Hero Image,
  Enrollment Start Date, Enrollment End Date,   (YYYY-MM-DD)
  Primary Color,                                (#RRGGBB)
  Button 1 Text, Button 1 URL, Button 2 Text, Button 2 URL,
  Footer Content, Footer Disclaimer,
  Tile 1 Headline, Tile 1 Description, Tile 1 Link, Tile 1 Image,
  Tile 2 Headline, ...

Tiles are read in order until the first missing headline. A published site
needs at least 3 complete tiles.

Wherever a RECORD is expected you can pass either a record .json file (see
'microsite template') or a data sheet, which is extracted on the fly.

Run 'microsite gen-config' to generate a documented microsite.toml.")]
#[command(version)]
struct Cli {
    /// Config file (optional; stock defaults apply when absent)
    #[arg(long, default_value = "microsite.toml", global = true)]
    config: PathBuf,

    /// More log output on stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a data sheet and extract its content record
    Extract {
        /// Data sheet (.xlsx or .csv)
        file: PathBuf,
        /// Write the record as JSON here
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Report everything that blocks publishing
    Check {
        record: PathBuf,
        /// Use the editor's rule (one tile is enough)
        #[arg(long)]
        editor: bool,
    },
    /// Render the microsite to a static HTML page
    Build {
        record: PathBuf,
        /// Output directory
        #[arg(long, default_value = "dist")]
        output: PathBuf,
        /// Render the editor preview instead of the published site
        #[arg(long)]
        preview: bool,
        /// Use this image file as the employer logo
        #[arg(long)]
        logo: Option<PathBuf>,
        /// Use this image file as the hero image
        #[arg(long)]
        hero: Option<PathBuf>,
    },
    /// Change a record and save it
    Edit {
        record: PathBuf,
        /// Save here instead of overwriting RECORD
        #[arg(long)]
        out: Option<PathBuf>,
        #[command(subcommand)]
        op: EditOp,
    },
    /// Publish the microsite and print its URL
    Publish { record: PathBuf },
    /// Print the starting record as JSON
    Template,
    /// Print a stock microsite.toml with all options documented
    GenConfig,
}

#[derive(Subcommand)]
enum EditOp {
    /// Set a field by its column name, e.g. set "Primary Color" "#1f4e79"
    Set { field: String, value: String },
    /// Append a tile
    AddTile {
        #[arg(long, default_value = "")]
        headline: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        link: String,
        /// Image URL
        #[arg(long)]
        image: Option<String>,
    },
    /// Change fields of a tile
    UpdateTile {
        id: String,
        #[arg(long)]
        headline: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        link: Option<String>,
        /// Image URL
        #[arg(long, conflicts_with = "clear_image")]
        image: Option<String>,
        /// Remove the tile's image
        #[arg(long)]
        clear_image: bool,
    },
    /// Delete a tile
    RemoveTile { id: String },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Extract { file, out } => {
            let config = config::load_config(&cli.config)?;
            let mut uploader = Uploader::new(&config.upload);
            uploader.start(&file_name(&file), std::fs::read(&file)?)?;
            eprintln!("Processing {}...", file.display());
            let Some(outcome) = uploader.wait() else {
                return Err("upload was cancelled".into());
            };
            let done = outcome?;
            if let Some(out) = out {
                write_record(&done.record, &out)?;
            }
            output::print_record(&done.record, &done.ignored);
        }
        Command::Check { record, editor } => {
            let config = config::load_config(&cli.config)?;
            let record = load_record(&record, &config)?;
            let gate = if editor { Gate::Editor } else { Gate::Publish };
            let violations = validate(&record, gate);
            output::print_violations(&violations);
            if !violations.is_empty() {
                std::process::exit(1);
            }
        }
        Command::Build {
            record,
            output: output_dir,
            preview,
            logo,
            hero,
        } => {
            let config = config::load_config(&cli.config)?;
            let mut record = load_record(&record, &config)?;
            if let Some(path) = logo {
                let image = ImageRef::Transient(TransientImage::from_path(&path)?);
                record = record.with_image(ImageSlot::EmployerLogo, Some(image));
            }
            if let Some(path) = hero {
                let image = ImageRef::Transient(TransientImage::from_path(&path)?);
                record = record.with_image(ImageSlot::HeroImage, Some(image));
            }

            let variant = if preview { Variant::Preview } else { Variant::Site };
            let mut chooser = RandomChooser;
            let mut media = MediaCollector::new();
            let page = {
                let mut ctx = RenderContext {
                    variant,
                    brand: &config.brand,
                    placeholders: &config.placeholders.images,
                    year: chrono::Local::now().year(),
                    chooser: &mut chooser,
                    locators: &mut media,
                };
                render(&record, &mut ctx)
            };
            let page_path = html::write_site(&page, &media, &output_dir)?;
            output::print_build(&page, &page_path, media.len());
        }
        Command::Edit { record, out, op } => {
            let config = config::load_config(&cli.config)?;
            let current = load_record(&record, &config)?;
            let next = apply_edit(&current, op)?;
            let dest = match out {
                Some(out) => out,
                None if is_record_file(&record) => record,
                None => return Err("--out is required when editing a data sheet".into()),
            };
            write_record(&next, &dest)?;
            println!("Saved {}", dest.display());
            output::print_violations(&validate(&next, Gate::Editor));
        }
        Command::Publish { record } => {
            let config = config::load_config(&cli.config)?;
            let record = load_record(&record, &config)?;
            let mut publisher = Publisher::new(&config.publish);
            match publisher.publish(&record) {
                Ok(()) => {}
                Err(PublishError::Invalid(violations)) => {
                    output::print_violations(&violations);
                    std::process::exit(1);
                }
            }
            eprintln!("Publishing {}...", record.display_company_name());
            let Some(url) = publisher.wait() else {
                return Err("publish was cancelled".into());
            };
            output::print_published(record.display_company_name(), &url);
        }
        Command::Template => {
            println!("{}", serde_json::to_string_pretty(&ContentRecord::template())?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise `-v` flags pick the level.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_record_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Read a record JSON file, or extract a record from a data sheet.
fn load_record(path: &Path, config: &Config) -> Result<ContentRecord, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(path)?;
    if is_record_file(path) {
        return Ok(serde_json::from_slice(&bytes)?);
    }
    let done = Uploader::new(&config.upload).extract_now(&file_name(path), &bytes)?;
    Ok(done.record)
}

fn write_record(record: &ContentRecord, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(record)?;
    std::fs::write(path, json + "\n")?;
    Ok(())
}

fn apply_edit(
    record: &ContentRecord,
    op: EditOp,
) -> Result<ContentRecord, Box<dyn std::error::Error>> {
    let next = match op {
        EditOp::Set { field, value } => {
            let field: ScalarField = field.parse()?;
            record.with_field(field, value)
        }
        EditOp::AddTile {
            headline,
            description,
            link,
            image,
        } => {
            let mut tile = Tile::new(headline, description, link);
            if let Some(url) = image.filter(|u| !u.is_empty()) {
                tile = tile.with_image(ImageRef::url(url));
            }
            let id = tile.id.clone();
            let next = record.add_tile(tile)?;
            println!("Added tile {id}");
            next
        }
        EditOp::UpdateTile {
            id,
            headline,
            description,
            link,
            image,
            clear_image,
        } => {
            let patch = TilePatch {
                image: if clear_image {
                    Some(None)
                } else {
                    image.map(|url| Some(ImageRef::url(url)))
                },
                headline,
                description,
                link,
            };
            record.update_tile(&TileId::from(id.as_str()), patch)?
        }
        EditOp::RemoveTile { id } => record.remove_tile(&TileId::from(id.as_str()))?,
    };
    Ok(next)
}

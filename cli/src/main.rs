//! unxoj CLI - Xournal note document inspection tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use unxoj::{
    default_asset_dir, model::payload_extension, Background, Document, Element, JsonFormat,
    LoadHandler, ParseOptions, PixmapSource,
};

#[derive(Parser)]
#[command(name = "unxoj")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Inspect Xournal and Xournal++ note documents", long_about = None)]
struct Cli {
    /// Drop elements with broken image data instead of failing
    #[arg(long, global = true)]
    lenient: bool,

    /// Use this PDF as the page background source
    #[arg(long, global = true, value_name = "PDF", env = "UNXOJ_PDF_REPLACEMENT")]
    pdf_replacement: Option<PathBuf>,

    /// Mark the replacement PDF as attached to the document
    #[arg(long, global = true, requires = "pdf_replacement")]
    attach: bool,

    /// Replace PDF backgrounds with blank paper
    #[arg(long, global = true, conflicts_with = "pdf_replacement")]
    remove_pdf_background: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show document information
    Info {
        /// Input document
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert a document to JSON
    Json {
        /// Input document
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Extract embedded images and formula renderings
    Extract {
        /// Input document
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Info { input, json } => cmd_info(&cli, input, *json),
        Commands::Json {
            input,
            output,
            compact,
        } => cmd_json(&cli, input, output.as_deref(), *compact),
        Commands::Extract { input, output } => cmd_extract(&cli, input, output.as_deref()),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Load a document, applying the repair flags and reporting problems.
fn load(cli: &Cli, input: &Path) -> CliResult<Document> {
    let mut options = ParseOptions::new();
    if cli.lenient {
        options = options.lenient();
    }

    let mut handler = LoadHandler::with_options(options);
    if let Some(ref pdf) = cli.pdf_replacement {
        handler.set_pdf_replacement(pdf, cli.attach);
    } else if cli.remove_pdf_background {
        handler.remove_pdf_background();
    }

    let doc = handler.load_document(input)?;
    log::debug!("Loaded {} with {} warnings", input.display(), handler.warnings().len());

    for warning in handler.warnings() {
        eprintln!("{}: {}", "Warning".yellow().bold(), warning);
    }
    if let Some(missing) = handler.missing_pdf_filename() {
        eprintln!(
            "{}: background PDF {} not found; use --pdf-replacement or --remove-pdf-background",
            "Warning".yellow().bold(),
            missing.display()
        );
    }

    Ok(doc)
}

fn cmd_info(cli: &Cli, input: &Path, json: bool) -> CliResult<()> {
    let doc = load(cli, input)?;

    let (strokes, texts, images, formulas) = element_counts(&doc);
    let layers: usize = doc.pages.iter().map(|p| p.layer_count()).sum();

    if json {
        let summary = serde_json::json!({
            "file": input,
            "creator": doc.creator,
            "file_version": doc.file_version,
            "title": doc.title,
            "pages": doc.page_count(),
            "layers": layers,
            "strokes": strokes,
            "texts": texts,
            "images": images,
            "teximages": formulas,
            "pdf": doc.pdf,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Creator".bold(), doc.creator);
    println!("{}: {}", "File version".bold(), doc.file_version);
    if let Some(ref title) = doc.title {
        println!("{}: {}", "Title".bold(), title);
    }
    println!("{}: {}", "Pages".bold(), doc.page_count());

    if let Some(ref pdf) = doc.pdf {
        let status = if pdf.missing {
            "missing".red().to_string()
        } else {
            "found".green().to_string()
        };
        let kind = if pdf.attached { "attached" } else { "linked" };
        println!(
            "{}: {} ({}, {})",
            "Background PDF".bold(),
            pdf.path.display(),
            kind,
            status
        );
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Layers".bold(), layers);
    println!("{}: {}", "Strokes".bold(), strokes);
    println!("{}: {}", "Texts".bold(), texts);
    println!("{}: {}", "Images".bold(), images);
    println!("{}: {}", "Formulas".bold(), formulas);

    Ok(())
}

fn cmd_json(cli: &Cli, input: &Path, output: Option<&Path>, compact: bool) -> CliResult<()> {
    let doc = load(cli, input)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = unxoj::render::to_json(&doc, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_extract(cli: &Cli, input: &Path, output: Option<&Path>) -> CliResult<()> {
    let doc = load(cli, input)?;

    let output_dir = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_asset_dir(input));
    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new(doc.page_count() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut count = 0;
    for (page_no, page) in doc.pages.iter().enumerate() {
        pb.set_message(format!("page {}", page_no + 1));
        for (name, data) in page_assets(page_no, page) {
            fs::write(output_dir.join(&name), data)?;
            pb.println(format!("{} {}", "Extracted".green(), name));
            count += 1;
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!(
        "\n{} {} files extracted to {}",
        "Done!".green().bold(),
        count,
        output_dir.display()
    );

    Ok(())
}

/// Inline payloads of a page with the file names they are saved under.
fn page_assets(page_no: usize, page: &unxoj::Page) -> Vec<(String, &[u8])> {
    let mut assets = Vec::new();

    if let Background::Pixmap(PixmapSource::Inline { data }) = &page.background {
        let name = format!("page{}_background.{}", page_no + 1, payload_extension(data));
        assets.push((name, data.as_slice()));
    }

    for (layer_no, layer) in page.layers.iter().enumerate() {
        for (element_no, element) in layer.elements.iter().enumerate() {
            let (kind, data) = match element {
                Element::Image(image) => ("image", image.data.as_slice()),
                Element::TexImage(tex) => ("formula", tex.data.as_slice()),
                _ => continue,
            };
            let name = format!(
                "page{}_layer{}_{}{}.{}",
                page_no + 1,
                layer_no + 1,
                kind,
                element_no + 1,
                payload_extension(data)
            );
            assets.push((name, data));
        }
    }

    assets
}

fn element_counts(doc: &Document) -> (usize, usize, usize, usize) {
    let mut counts = (0, 0, 0, 0);
    for element in doc
        .pages
        .iter()
        .flat_map(|p| &p.layers)
        .flat_map(|l| &l.elements)
    {
        match element {
            Element::Stroke(_) => counts.0 += 1,
            Element::Text(_) => counts.1 += 1,
            Element::Image(_) => counts.2 += 1,
            Element::TexImage(_) => counts.3 += 1,
        }
    }
    counts
}

fn cmd_version() {
    println!("{} {}", "unxoj".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Xournal note document loader");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/unxoj".dimmed());
    println!("License: MIT");
}

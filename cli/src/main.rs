//! exam-reflow CLI - reading order and image mapping for exam page blocks

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use exam_reflow::{
    render, BlockReader, ColumnSegmenter, IngestOptions, JoinKeyMapper, JsonFormat, LayoutOptions,
    PageSelection, Reflow, RenderOptions,
};

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "exam-reflow")]
#[command(author = "iyulab")]
#[command(version)]
#[command(
    about = "Order exam page blocks for reading and map images to questions",
    long_about = None
)]
struct Cli {
    /// Input block JSON file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(flatten)]
    layout: LayoutArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Layout and ingestion flags shared by every command.
#[derive(Args, Clone, Default)]
struct LayoutArgs {
    /// Minimum midpoint gap for a column split, relative to page width
    #[arg(long, global = true, value_name = "FRACTION")]
    gap_fraction: Option<f64>,

    /// Minimum width of a full-width block, relative to a column
    #[arg(long, global = true, value_name = "FRACTION")]
    full_width_fraction: Option<f64>,

    /// Near-tie band above the gap threshold that still reads as one column
    #[arg(long, global = true, value_name = "FRACTION")]
    tie_tolerance: Option<f64>,

    /// Process pages one at a time
    #[arg(long, global = true)]
    sequential: bool,

    /// Drop malformed blocks instead of failing
    #[arg(long, global = true)]
    lenient: bool,

    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long, global = true)]
    pages: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print text in reading order
    Order {
        /// Input block JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output the segment sequence as JSON
        #[arg(long)]
        json: bool,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Omit "--- Page N ---" headers
        #[arg(long)]
        no_headers: bool,
    },

    /// Associate each image with its nearest text block
    #[command(alias = "assoc")]
    Associate {
        /// Input block JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Map images to question join keys
    Map {
        /// Input block JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Source name used for consecutive-question keys (defaults to the file stem)
        #[arg(long)]
        source: Option<String>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show document and layout information
    Info {
        /// Input block JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Run order, associate and map over several files
    Batch {
        /// Input block JSON files
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let layout = cli.layout;

    let result = match cli.command {
        Some(Commands::Order {
            input,
            output,
            json,
            compact,
            no_headers,
        }) => cmd_order(&input, output.as_deref(), &layout, json, compact, no_headers),
        Some(Commands::Associate {
            input,
            output,
            compact,
        }) => cmd_associate(&input, output.as_deref(), &layout, compact),
        Some(Commands::Map {
            input,
            output,
            source,
            compact,
        }) => cmd_map(&input, output.as_deref(), &layout, source, compact),
        Some(Commands::Info { input }) => cmd_info(&input, &layout),
        Some(Commands::Batch { inputs, output }) => cmd_batch(&inputs, output.as_deref(), &layout),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: print ordered text if input is provided
            if let Some(input) = cli.input {
                cmd_order(&input, None, &layout, false, false, false)
            } else {
                println!("{}", "Usage: exam-reflow <FILE>".yellow());
                println!("       exam-reflow --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

impl LayoutArgs {
    fn layout_options(&self) -> LayoutOptions {
        let mut options = LayoutOptions::new().with_parallel(!self.sequential);
        if let Some(f) = self.gap_fraction {
            options = options.with_gap_fraction(f);
        }
        if let Some(f) = self.full_width_fraction {
            options = options.with_full_width_fraction(f);
        }
        if let Some(t) = self.tie_tolerance {
            options = options.with_tie_tolerance(t);
        }
        options
    }

    fn page_selection(&self) -> CliResult<PageSelection> {
        Ok(match self.pages.as_deref() {
            Some(p) => PageSelection::parse(p)?,
            None => PageSelection::All,
        })
    }

    fn ingest_options(&self) -> CliResult<IngestOptions> {
        let mut options = IngestOptions::new().with_pages(self.page_selection()?);
        if self.lenient {
            options = options.lenient();
        }
        Ok(options)
    }

    fn reflow(&self) -> CliResult<Reflow> {
        let mut reflow = Reflow::new()
            .with_layout_options(self.layout_options())
            .with_pages(self.page_selection()?);
        if self.lenient {
            reflow = reflow.lenient();
        }
        Ok(reflow)
    }
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn write_output(output: Option<&Path>, content: &str) -> CliResult {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_order(
    input: &Path,
    output: Option<&Path>,
    layout: &LayoutArgs,
    json: bool,
    compact: bool,
    no_headers: bool,
) -> CliResult {
    let result = layout
        .reflow()?
        .with_render_options(RenderOptions::new().with_page_headers(!no_headers))
        .process(input)?;

    let content = if json {
        result.sequence_json(json_format(compact))?
    } else {
        result.to_text()
    };
    write_output(output, &content)
}

fn cmd_associate(
    input: &Path,
    output: Option<&Path>,
    layout: &LayoutArgs,
    compact: bool,
) -> CliResult {
    let result = layout.reflow()?.process(input)?;
    let json = result.associations_json(json_format(compact))?;
    write_output(output, &json)
}

fn cmd_map(
    input: &Path,
    output: Option<&Path>,
    layout: &LayoutArgs,
    source: Option<String>,
    compact: bool,
) -> CliResult {
    let result = layout.reflow()?.process(input)?;
    let source = source.or_else(|| result.document.source.clone());
    let mapping = JoinKeyMapper::for_source(source.as_deref()).map(&result.associations);

    let unmatched = result
        .associations
        .iter()
        .filter(|r| r.is_associated())
        .count()
        .saturating_sub(mapping.entries.values().map(Vec::len).sum::<usize>());
    if unmatched > 0 {
        log::info!("{} associated image(s) carried no join key", unmatched);
    }

    let json = render::to_json(&mapping, json_format(compact))?;
    write_output(output, &json)
}

fn cmd_info(input: &Path, layout: &LayoutArgs) -> CliResult {
    let doc = BlockReader::open_with_options(input, layout.ingest_options()?)?.read()?;
    let options = layout.layout_options();
    options.validate()?;
    let segmenter = ColumnSegmenter::new(&options);

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    if let Some(ref source) = doc.source {
        println!("{}: {}", "Source".bold(), source);
    }
    println!("{}: {}", "Pages".bold(), doc.page_count());
    println!("{}: {}", "Text blocks".bold(), doc.text_count());
    println!("{}: {}", "Image blocks".bold(), doc.image_count());

    println!();
    println!("{}", "Page Layout".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for page in doc.pages_in_order() {
        let columns = segmenter.segment(page);
        let summary = match columns.split {
            Some(split) => format!("2 columns (split at x={:.1})", split),
            None if columns.column_count() == 0 => "no text".to_string(),
            None => "1 column".to_string(),
        };
        let full_width = columns.full_width().count();
        print!("{} {}: {}", "Page".bold(), page.index + 1, summary);
        if full_width > 0 {
            print!(", {} full-width", full_width);
        }
        println!(
            ", {} text, {} image",
            page.text_count(),
            page.image_count()
        );
    }

    Ok(())
}

fn cmd_batch(inputs: &[PathBuf], output: Option<&Path>, layout: &LayoutArgs) -> CliResult {
    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("reflow_output"));
    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut failures = 0;
    for input in inputs {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        pb.set_message(stem.to_string());

        if let Err(e) = process_one(input, &output_dir.join(stem.as_ref()), layout) {
            pb.println(format!("{} {}: {}", "Failed".red(), input.display(), e));
            failures += 1;
        }
        pb.inc(1);
    }

    pb.finish_with_message("Done!");
    println!(
        "\n{} {} processed, {} failed",
        "Batch complete:".green().bold(),
        inputs.len() - failures,
        failures
    );
    println!("  {} <name>/ordered.txt", "├─".dimmed());
    println!("  {} <name>/associations.json", "├─".dimmed());
    println!("  {} <name>/image_mapping.json", "└─".dimmed());

    if failures > 0 {
        return Err(format!("{} file(s) failed", failures).into());
    }
    Ok(())
}

fn process_one(input: &Path, dir: &Path, layout: &LayoutArgs) -> CliResult {
    let result = layout.reflow()?.process(input)?;
    fs::create_dir_all(dir)?;
    fs::write(dir.join("ordered.txt"), result.to_text())?;
    fs::write(
        dir.join("associations.json"),
        result.associations_json(JsonFormat::Pretty)?,
    )?;
    fs::write(
        dir.join("image_mapping.json"),
        render::to_json(&result.image_mapping(), JsonFormat::Pretty)?,
    )?;
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "exam-reflow".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Reading order and image mapping for exam page blocks");
    println!();
    println!("License: MIT");
}

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use pdf_booklet::{
    BookletOptions, BookletStatistics, DocumentSource, FileSource, ImposeOptions, JoinOptions,
    PdfDocument,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pdfm", about = "Split, impose and join PDFs for printing", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build print-ready booklets: split, impose each split, merge
    Booklet {
        /// Input PDF file(s); each one becomes its own job
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Directory receiving `<job>_booklets_for_printing.pdf`
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Largest number of pages per split [default: 40]
        #[arg(long)]
        max_pages: Option<usize>,

        /// `false` shifts every page by one with a leading blank page [default: true]
        #[arg(long, action = ArgAction::Set)]
        same_page_parity: Option<bool>,

        /// Margin around content and columns, in centimeters [default: 1.0]
        #[arg(long)]
        margin_cm: Option<f32>,

        /// Do not stamp the first sheet of each split
        #[arg(long)]
        no_watermark: bool,

        /// Load options from a JSON file; flags given on the command line win
        #[arg(long)]
        config: Option<PathBuf>,

        /// Show statistics only, don't generate PDF
        #[arg(long)]
        stats_only: bool,
    },

    /// Split a PDF into `splitNN.pdf` files
    Split {
        /// Input PDF file
        #[arg(short, long)]
        input: PathBuf,

        /// Directory receiving the splits
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Largest number of pages per split
        #[arg(long, default_value = "40")]
        max_pages: usize,

        /// `false` shifts every page by one with a leading blank page
        #[arg(long, action = ArgAction::Set, default_value = "true")]
        same_page_parity: bool,
    },

    /// Impose a single PDF as one booklet, without splitting
    Impose {
        /// Input PDF file
        #[arg(short, long)]
        input: PathBuf,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        /// Margin around content and columns, in centimeters
        #[arg(long, default_value = "1.0")]
        margin_cm: f32,

        /// Do not stamp the first sheet
        #[arg(long)]
        no_watermark: bool,
    },

    /// Join PDFs in order
    Join {
        /// Input PDF files, in output order
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Directory receiving `<job>_joined.pdf`
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Start every document on an odd page
        #[arg(long, action = ArgAction::Set, default_value = "true")]
        preserve_parity: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Booklet {
            input,
            output_dir,
            max_pages,
            same_page_parity,
            margin_cm,
            no_watermark,
            config,
            stats_only,
        } => {
            let mut options = match config {
                Some(path) => BookletOptions::load(&path).await?,
                None => BookletOptions::default(),
            };
            if let Some(max_pages) = max_pages {
                options.max_pages_per_split = max_pages;
            }
            if let Some(same_page_parity) = same_page_parity {
                options.same_page_parity = same_page_parity;
            }
            if let Some(margin_cm) = margin_cm {
                options.margin_cm = margin_cm;
            }
            if no_watermark {
                options.add_watermark = false;
            }
            options.validate()?;

            if stats_only {
                // Failures are logged by the batch runner
                let results = tokio::task::spawn_blocking(move || {
                    pdf_booklet::batch_statistics(&input, &options)
                })
                .await?;

                let mut failures = 0;
                for (path, result) in results {
                    match result {
                        Ok(stats) => print_statistics(&path, &stats),
                        Err(_) => failures += 1,
                    }
                }
                if failures > 0 {
                    anyhow::bail!("{} input(s) failed", failures);
                }
                return Ok(());
            }

            let results = tokio::task::spawn_blocking(move || {
                pdf_booklet::run_booklet_batch(&input, &options, &output_dir)
            })
            .await?;

            // Failures are logged by the batch runner
            let mut failures = 0;
            for (path, result) in results {
                match result {
                    Ok(job) => println!("{} → {}", path.display(), job.output_path.display()),
                    Err(_) => failures += 1,
                }
            }
            if failures > 0 {
                anyhow::bail!("{} input(s) failed", failures);
            }
        }

        Commands::Split {
            input,
            output_dir,
            max_pages,
            same_page_parity,
        } => {
            let options = BookletOptions {
                max_pages_per_split: max_pages,
                same_page_parity,
                ..Default::default()
            };
            options.validate()?;

            let doc = open_pdf(input).await?;
            let paths = tokio::task::spawn_blocking(move || {
                pdf_booklet::split_to_dir(
                    &doc,
                    &output_dir,
                    options.max_pages_per_split,
                    options.same_page_parity,
                )
            })
            .await??;
            for path in paths {
                println!("{}", path.display());
            }
        }

        Commands::Impose {
            input,
            output,
            margin_cm,
            no_watermark,
        } => {
            let options = ImposeOptions {
                margin_cm,
                add_watermark: !no_watermark,
            };
            let doc = open_pdf(input).await?;
            let source_pages = doc.page_count();
            let mut imposed = pdf_booklet::impose_async(doc, options).await?;
            imposed.save(&output)?;
            println!(
                "Imposed {} pages onto {} sheets → {}",
                source_pages,
                imposed.page_count(),
                output.display()
            );
        }

        Commands::Join {
            input,
            output_dir,
            preserve_parity,
        } => {
            let options = JoinOptions { preserve_parity };
            let job = pdf_booklet::run_join_job_async(input, options, output_dir).await?;
            println!("Joined → {}", job.output_path.display());
        }
    }

    Ok(())
}

async fn open_pdf(path: PathBuf) -> Result<PdfDocument> {
    let doc = tokio::task::spawn_blocking(move || FileSource::new(path).open()).await??;
    Ok(doc)
}

fn print_statistics(path: &Path, stats: &BookletStatistics) {
    println!("{}:", path.display());
    println!("  Source pages: {}", stats.source_pages);
    println!("  Leading blank pages: {}", stats.shim_pages);
    println!("  Splits: {:?}", stats.split_sizes);
    println!("  Sheets per split: {:?}", stats.sheets_per_split);
    println!("  Output sheets: {}", stats.output_sheets);
    println!("  Blank pages added: {}", stats.blank_pages_added);
    if !stats.dropped_pages.is_empty() {
        println!("  Skipped pages: {:?}", stats.dropped_pages);
    }
}

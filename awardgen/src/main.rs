//! Awardgen CLI - one PDF award letter per recipient
//!
//! ```bash
//! awardgen generate recipients.csv letter.txt        # write PDFs to the current directory
//! awardgen generate recipients.csv letter.txt -o out --report run.json
//! awardgen generate recipients.csv letter.txt --dry-run
//! awardgen preview recipients.csv letter.txt --limit 2
//! awardgen check recipients.csv                      # validate only, no output
//! ```

use clap::{Parser, Subcommand};
use awardgen::report::log_error;
use awardgen::{check, run, validate, PageLayout, RecordSource, RunOptions, Template};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "awardgen")]
#[command(about = "Generate personalized award letters as PDF documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one PDF letter per valid recipient
    Generate {
        /// Recipient list (header: FIRST-NAME;LAST-NAME;CONCEPT;AMOUNT)
        input: PathBuf,

        /// Letter template
        template: PathBuf,

        /// Field delimiter
        #[arg(short, long, default_value = ";")]
        delimiter: char,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Font size in points
        #[arg(long, default_value = "12")]
        font_size: f32,

        /// Write a JSON report of every record's outcome
        #[arg(long)]
        report: Option<PathBuf>,

        /// Validate and render only, write no PDFs
        #[arg(long)]
        dry_run: bool,
    },

    /// Print rendered letters to stdout
    Preview {
        /// Recipient list
        input: PathBuf,

        /// Letter template
        template: PathBuf,

        /// Field delimiter
        #[arg(short, long, default_value = ";")]
        delimiter: char,

        /// Stop after this many letters
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Validate the recipient list without a template, write nothing
    Check {
        /// Recipient list
        input: PathBuf,

        /// Field delimiter
        #[arg(short, long, default_value = ";")]
        delimiter: char,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            input,
            template,
            delimiter,
            output_dir,
            font_size,
            report,
            dry_run,
        } => {
            let options = RunOptions {
                input,
                template,
                delimiter,
                output_dir,
                layout: PageLayout {
                    font_size,
                    ..PageLayout::default()
                },
                dry_run,
            };
            cmd_generate(&options, report.as_deref())
        }

        Commands::Preview {
            input,
            template,
            delimiter,
            limit,
        } => cmd_preview(&input, &template, delimiter, limit),

        Commands::Check { input, delimiter } => cmd_check(&input, delimiter),
    };

    if let Err(e) = result {
        log_error(format!("Error: {}", e));
        std::process::exit(1);
    }
}

fn cmd_generate(options: &RunOptions, report: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = run(options)?;

    if let Some(path) = report {
        outcome.save_json(path)?;
        eprintln!("💾 Report written to: {}", path.display());
    }

    if outcome.is_aborted() {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_check(input: &Path, delimiter: char) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = check(input, delimiter)?;

    if outcome.is_aborted() {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_preview(
    input: &Path,
    template: &Path,
    delimiter: char,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let template = Template::load(template)?;
    let source = RecordSource::open(input, delimiter)?;

    let mut shown = 0;
    for item in source {
        if limit.is_some_and(|max| shown >= max) {
            break;
        }

        let record = match item {
            Ok(record) => record,
            Err(e) if e.is_recoverable() => {
                eprintln!("⚠️  {}", e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        match validate(&record) {
            Ok(recipient) => {
                println!("── Line {}: {} ──", record.line, recipient.display_name());
                println!("{}\n", template.render(&recipient));
                shown += 1;
            }
            Err(e) => eprintln!("⚠️  Line {}: {}", record.line, e),
        }
    }

    Ok(())
}

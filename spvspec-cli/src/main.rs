// CLI application
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

mod commands;

use commands::{classify_cell, extract_spec, inspect_spec, write_default_config};

#[derive(Parser)]
#[command(name = "spvspec")]
#[command(about = "SPIR-V specification extractor")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Extract the specification grammar to JSON
    Extract {
        /// Path to the core specification HTML
        #[arg(short, long)]
        spec: PathBuf,

        /// Extended instruction set document as <layout>=<html>, e.g. GLSL.std.450=GLSL.std.450.html
        #[arg(short, long)]
        extended: Vec<String>,

        /// Path to an extraction config (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output JSON file
        #[arg(short, long, default_value = "spirv.json")]
        output: PathBuf,

        /// Write compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// Run an extraction and print statistics and the review report
    Inspect {
        /// Path to the core specification HTML
        #[arg(short, long)]
        spec: PathBuf,

        /// Extended instruction set document as <layout>=<html>
        #[arg(short, long)]
        extended: Vec<String>,

        /// Path to an extraction config (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Classify the text of one operand cell
    Classify {
        /// Cell text; use \n for line breaks
        text: String,

        /// The cell links to a type definition
        #[arg(long)]
        link: bool,
    },
    /// Write the default extraction config
    Config {
        /// Output JSON file
        #[arg(short, long, default_value = "spvspec.json")]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            spec,
            extended,
            config,
            output,
            compact,
        } => {
            let pb = create_progress_bar("Extracting specification...");
            extract_spec(&spec, &extended, config.as_deref(), &output, compact)?;
            pb.finish_with_message("Extraction complete");
        }
        Commands::Inspect {
            spec,
            extended,
            config,
        } => {
            let pb = create_progress_bar("Inspecting specification...");
            let summary = inspect_spec(&spec, &extended, config.as_deref())?;
            pb.finish_with_message("Inspection complete");
            println!("{}", summary);
        }
        Commands::Classify { text, link } => {
            classify_cell(&text, link);
        }
        Commands::Config { output } => {
            write_default_config(&output)?;
        }
    }

    Ok(())
}

fn create_progress_bar(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

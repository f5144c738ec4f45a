use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crossfill::{find_fill, load_structure_file, render_grid, save_svg, SvgConfig, WordList};

#[derive(Parser)]
#[command(name = "crossfill")]
#[command(about = "Fill a crossword grid from a word list")]
struct Cli {
    /// Grid structure file: `_` for open cells, anything else for blocks
    structure: PathBuf,

    /// Word list file, one word per line
    words: PathBuf,

    /// Write the filled grid to this path as an SVG image
    output: Option<PathBuf>,

    /// Print search statistics to stderr
    #[arg(long)]
    stats: bool,

    /// Log search progress (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), default_level))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match load_structure_file(&cli.structure) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::FAILURE;
        }
    };
    let word_list = match WordList::from_file(&cli.words) {
        Ok(word_list) => word_list,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    info!(slots = config.slot_count(), words = word_list.len(), "filling grid");

    let (result, statistics) = match find_fill(&config, &word_list) {
        Ok(success) => (Some(success.assignment), success.statistics),
        Err(failure) => (None, failure.statistics().clone()),
    };

    if cli.stats {
        eprintln!("{:?}", statistics);
    }

    let Some(assignment) = result else {
        println!("No solution.");
        return ExitCode::SUCCESS;
    };

    println!("{}", render_grid(&config, &word_list, &assignment));

    if let Some(output) = &cli.output {
        if let Err(err) = save_svg(output, &config, &word_list, &assignment, &SvgConfig::default()) {
            eprintln!("Error: {}", err);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}

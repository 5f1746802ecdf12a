use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod utils;

#[derive(Parser)]
#[command(name = "cachefile-cmd")]
#[command(about = "Stream utilities built on single-window buffered I/O")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v for debug, -vv for trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy a file or standard input to a file or standard output
    Cat {
        /// Input file (defaults to stdin)
        #[arg(short, long)]
        input: Option<String>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Cache window size and copy chunk size in bytes
        #[arg(short, long, default_value_t = cachefile::BLOCK)]
        block_size: usize,
    },

    /// Write the bytes of a regular file in reverse order
    Reverse {
        /// Input file (defaults to stdin, which must be a regular file)
        #[arg(short, long)]
        input: Option<String>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    utils::init_logging(cli.verbose);

    match cli.command {
        Commands::Cat {
            input,
            output,
            block_size,
        } => commands::cat::run(input, output, block_size),
        Commands::Reverse { input, output } => commands::reverse::run(input, output),
    }
}

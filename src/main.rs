use anyhow::Result;
use clap::{Parser, Subcommand};
use segconv::commands;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "seg2segy")]
#[command(about = "Convert SEG2 seismic files to SEG-Y/SU trace streams", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a SEG2 file into an SU file
    Convert {
        /// Input SEG2 file
        #[arg(short, long)]
        input: String,

        /// Output SU file (created or truncated)
        #[arg(short, long)]
        output: String,
    },

    /// Print the file header and string headers of a SEG2 file
    Seg2Info {
        /// Input SEG2 file
        #[arg(short, long)]
        input: String,

        /// Print only the file header and trace count
        #[arg(long)]
        summary: bool,
    },

    /// Print per-trace header summaries of an SU file
    SuInfo {
        /// Input SU file
        #[arg(short, long)]
        input: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Convert { input, output } => commands::convert::execute(&input, &output),
        Commands::Seg2Info { input, summary } => commands::info::execute_seg2(&input, summary),
        Commands::SuInfo { input } => commands::info::execute_su(&input),
    }
}

use barco_bill::commands::*;
use barco_bill::core::{config::BarcoConfig, error::Result, print_error};
use clap::{Parser, Subcommand};
use std::env;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "barco")]
#[command(about = "Barcode scanning checkout counter with receipt printing")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Read configuration from this file instead of the user config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a checkout session reading barcodes from the console or a scanner
    Session(SessionArgs),
    /// Look up a single product in the catalog
    Lookup {
        /// Barcode to look up (e.g. 5449000000996)
        barcode: String,
        /// Print the product as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Configure logging based on --debug flag
    if cli.debug {
        env::set_var("RUST_LOG", "debug");
    } else if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let config = BarcoConfig::resolve(cli.config.as_deref());

    let result: Result<()> = match cli.command {
        Commands::Session(args) => execute_session(args, &config),
        Commands::Lookup { barcode, json } => execute_lookup(&barcode, json, &config),
    };

    if let Err(e) = result {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

mod commands;

use commands::{cart, product};

#[derive(Parser)]
#[command(name = "nb")]
#[command(about = "NoaBea storefront CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve and print a product (falls back to the first available one)
    Product {
        /// Product handle; defaults to the configured featured handle
        #[arg(long)]
        handle: Option<String>,
    },

    /// One-shot cart operations
    Cart {
        #[command(subcommand)]
        cmd: CartCmd,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> env overrides)
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

#[derive(Subcommand)]
enum CartCmd {
    /// Print the current cart
    Show,

    /// Add merchandise to the cart
    Add {
        #[arg(long)]
        merchandise_id: String,

        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },

    /// Change a line's quantity
    Update {
        #[arg(long)]
        line_id: String,

        #[arg(long)]
        quantity: u32,
    },

    /// Remove a line
    Remove {
        #[arg(long)]
        line_id: String,
    },
}

fn main() -> Result<()> {
    // Dev convenience; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Product { handle } => product::run(handle),
        Commands::Cart { cmd } => match cmd {
            CartCmd::Show => cart::show(),
            CartCmd::Add {
                merchandise_id,
                quantity,
            } => cart::add(&merchandise_id, quantity),
            CartCmd::Update { line_id, quantity } => cart::update(&line_id, quantity),
            CartCmd::Remove { line_id } => cart::remove(&line_id),
        },
        Commands::ConfigHash { paths } => config_hash(&paths),
    }
}

fn config_hash(paths: &[String]) -> Result<()> {
    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    let loaded = nb_config::load_layered_yaml(&path_refs).context("loading layered config")?;
    println!("config_hash: {}", loaded.config_hash);
    println!("{}", loaded.canonical_json);
    Ok(())
}

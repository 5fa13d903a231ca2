mod cli;

use imagehost::{config, images, server};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config::validate_config(&config)?;

    tracing::info!("Starting imagehost server");
    tracing::info!(
        "Media root {:?} served at {}, database {:?}",
        config.storage.media_root,
        config.storage.media_url,
        config.storage.database_path
    );

    server::start_server(config).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "imagehost=trace,imagehost_db=debug,imagehost_common=debug,tower_http=debug".to_string()
        } else {
            "imagehost=debug,imagehost_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Prepare {
            input,
            width,
            height,
            output,
        } => prepare_file(&input, width, height, output),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("imagehost {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn prepare_file(input: &Path, width: u32, height: u32, output: Option<PathBuf>) -> Result<()> {
    let data = std::fs::read(input).with_context(|| format!("Failed to read {:?}", input))?;
    let filename = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let prepared = images::prepare_image(data.into(), &filename, width, height)
        .with_context(|| format!("Failed to prepare {:?}", input))?;

    let output = output.unwrap_or_else(|| default_output(input, prepared.width, prepared.height));
    std::fs::write(&output, &prepared.data)
        .with_context(|| format!("Failed to write {:?}", output))?;

    println!(
        "{} -> {} ({}x{}{})",
        input.display(),
        output.display(),
        prepared.width,
        prepared.height,
        if prepared.resized { "" } else { ", unchanged" }
    );

    Ok(())
}

/// `<stem>_<w>x<h>.<ext>` next to `input`.
fn default_output(input: &Path, width: u32, height: u32) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let name = match input.extension() {
        Some(ext) => format!("{}_{}x{}.{}", stem, width, height, ext.to_string_lossy()),
        None => format!("{}_{}x{}", stem, width, height),
    };
    input.with_file_name(name)
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            print_summary(&config);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            print_summary(&config);
        }
    }

    Ok(())
}

fn print_summary(config: &config::Config) {
    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Media root: {}", config.storage.media_root.display());
    println!("  Media URL: {}", config.storage.media_url);
    println!("  Database: {}", config.storage.database_path.display());
    println!("  Max upload: {} bytes", config.storage.max_upload_bytes);
}

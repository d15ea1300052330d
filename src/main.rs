//! texcrunch - batch texture import-settings compressor
//!
//! Rewrites crunch quality, compression level and max size for every texture
//! in a project, a few textures per tick, with Ctrl-C to cancel.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use texcrunch::compressor::Compressor;
use texcrunch::config::CompressionConfig;
use texcrunch::host::{self, HostOptions, DEFAULT_TICK_RATE};
use texcrunch::job::JobStatus;
use texcrunch::store::{AssetStore, FileStore};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "texcrunch")]
#[command(version)]
#[command(about = "Batch-adjust texture import settings across a project")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (use RUST_LOG=debug for more detail)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress every eligible texture in a project
    Compress {
        /// Project directory
        project: PathBuf,

        /// JSON configuration file (flags below override it)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Textures processed per tick (1-20)
        #[arg(short = 'n', long)]
        chunk_size: Option<usize>,

        /// Crunch compression quality (0-100)
        #[arg(short, long)]
        quality: Option<u8>,

        /// Leave crunch compression settings untouched
        #[arg(long)]
        no_crunch: bool,

        /// Clamp the max texture size to this value
        #[arg(long)]
        max_size: Option<u32>,

        /// Downgrade textures to low-quality compression
        #[arg(long)]
        low_res: bool,

        /// Ticks per second
        #[arg(long, default_value_t = DEFAULT_TICK_RATE)]
        tick_rate: u32,

        /// Only report how many textures would be changed
        #[arg(long)]
        dry_run: bool,
    },

    /// List textures and their current import settings
    Scan {
        /// Project directory
        project: PathBuf,
    },
}

/// Merge the config file (or defaults) with command-line overrides
fn build_config(
    config: Option<PathBuf>,
    chunk_size: Option<usize>,
    quality: Option<u8>,
    no_crunch: bool,
    max_size: Option<u32>,
    low_res: bool,
) -> Result<CompressionConfig> {
    let mut cfg = match config {
        Some(path) => CompressionConfig::load(&path)?,
        None => CompressionConfig::default(),
    };

    if let Some(n) = chunk_size {
        cfg.chunk_size = n;
    }
    if let Some(q) = quality {
        cfg.compression_quality = q;
    }
    if no_crunch {
        cfg.use_crunch_compression = false;
    }
    if let Some(size) = max_size {
        cfg.clamp_max_size = true;
        cfg.max_size_value = size;
    }
    if low_res {
        cfg.force_low_resolution = true;
    }

    cfg.validate()?;
    Ok(cfg)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Only initialize logging if verbose or RUST_LOG is set
    if cli.verbose || std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::from_default_env()
                    .add_directive(if cli.verbose { "texcrunch=debug".parse()? } else { "texcrunch=warn".parse()? }),
            )
            .init();
    }

    match cli.command {
        Commands::Compress {
            project,
            config,
            chunk_size,
            quality,
            no_crunch,
            max_size,
            low_res,
            tick_rate,
            dry_run,
        } => {
            let config = build_config(config, chunk_size, quality, no_crunch, max_size, low_res)?;
            let store = FileStore::open(&project)
                .with_context(|| format!("Cannot open project {}", project.display()))?;
            let mut compressor = Compressor::new(store);

            println!("texcrunch - {}", project.display());
            println!("Chunk size: {} per tick", config.chunk_size);
            if config.use_crunch_compression {
                println!("Crunch:     quality {}", config.compression_quality);
            }
            if config.clamp_max_size {
                println!("Max size:   {}", config.max_size_value);
            }
            if config.force_low_resolution {
                println!("Low res:    enabled");
            }
            println!();

            if dry_run {
                let eligible = compressor.eligible(&config)?;
                for handle in &eligible {
                    println!("  {}", handle);
                }
                println!("\n{} textures would be changed", eligible.len());
                return Ok(());
            }

            let options = HostOptions {
                tick_rate,
                show_progress: true,
            };
            let report = host::run(&mut compressor, &config, &options, host::ctrl_c()).await?;

            if let Some(message) = &report.message {
                println!("{}", message);
            }
            if let Some(summary) = &report.summary {
                println!(
                    "Processed {}/{} textures in {} ticks",
                    summary.processed, summary.total, report.ticks
                );
                if !summary.failed.is_empty() {
                    println!("\n{} textures could not be reimported:", summary.failed.len());
                    for handle in &summary.failed {
                        println!("    - {}", handle);
                    }
                }
            }

            if report.status == JobStatus::Cancelled {
                println!("\nTextures processed before cancelling keep their new settings.");
            }
        }

        Commands::Scan { project } => {
            let store = FileStore::open(&project)
                .with_context(|| format!("Cannot open project {}", project.display()))?;

            let textures = store.find_textures()?;
            let mut without_importer = 0;

            for handle in &textures {
                match store.importer(handle)? {
                    Some(s) => println!(
                        "{:>3} {:<6} {:<13} {:>5}  {}",
                        s.compression_quality,
                        if s.crunched_compression { "crunch" } else { "-" },
                        s.texture_compression.name(),
                        s.max_texture_size,
                        handle
                    ),
                    None => {
                        without_importer += 1;
                        println!("{:>3} {:<6} {:<13} {:>5}  {}", "?", "?", "?", "?", handle);
                    }
                }
            }

            eprintln!("\nTotal: {} textures ({} without importer)", textures.len(), without_importer);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_compress() {
        let cli = Cli::try_parse_from([
            "texcrunch", "compress", "/proj", "-n", "5", "--quality", "60", "--max-size", "512", "--low-res",
        ])
        .unwrap();

        match cli.command {
            Commands::Compress { project, chunk_size, quality, max_size, low_res, dry_run, tick_rate, .. } => {
                assert_eq!(project, PathBuf::from("/proj"));
                assert_eq!(chunk_size, Some(5));
                assert_eq!(quality, Some(60));
                assert_eq!(max_size, Some(512));
                assert!(low_res);
                assert!(!dry_run);
                assert_eq!(tick_rate, DEFAULT_TICK_RATE);
            }
            _ => panic!("expected compress"),
        }
    }

    #[test]
    fn test_build_config_overrides() {
        let cfg = build_config(None, Some(20), Some(90), false, Some(256), true).unwrap();
        assert_eq!(cfg.chunk_size, 20);
        assert_eq!(cfg.compression_quality, 90);
        assert!(cfg.clamp_max_size);
        assert_eq!(cfg.max_size_value, 256);
        assert!(cfg.force_low_resolution);
        assert!(cfg.use_crunch_compression);
    }

    #[test]
    fn test_build_config_rejects_out_of_range() {
        assert!(build_config(None, Some(25), None, false, None, false).is_err());
        assert!(build_config(None, None, Some(101), false, None, false).is_err());
        assert!(build_config(None, None, None, false, Some(300), false).is_err());
    }
}

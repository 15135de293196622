//! StegFS CLI
//!
//! Command-line interface for files hidden inside a BMP image.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use stegfs::{container, Result, StegError, Store, StoreConfig};
use tracing_subscriber::{fmt, EnvFilter};

/// StegFS CLI
#[derive(Parser, Debug)]
#[command(name = "stegfs")]
#[command(about = "Store files inside the pixel data of a BMP image")]
#[command(version)]
struct Args {
    /// BMP container file
    bmp: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List hidden files
    Ls {
        /// Show offsets and CRC32 checksums
        #[arg(short, long)]
        long: bool,
    },

    /// Print the contents of a hidden file
    Cat {
        /// Name of the hidden file
        name: String,
    },

    /// Write a hidden file
    Write {
        /// Name of the hidden file
        name: String,

        /// Text content
        #[arg(required_unless_present = "from", conflicts_with = "from")]
        text: Option<String>,

        /// Read content from a file instead
        #[arg(long)]
        from: Option<PathBuf>,
    },

    /// Delete a hidden file
    Delete {
        /// Name of the hidden file
        name: String,
    },

    /// Create a blank BMP to use as a container
    Init {
        /// Image width in pixels
        #[arg(long, default_value = "512")]
        width: u32,

        /// Image height in pixels
        #[arg(long, default_value = "512")]
        height: u32,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show space usage
    Info,
}

fn main() -> ExitCode {
    // Logs go to stderr so `cat` output stays clean
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,stegfs=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Commands::Init { width, height, force } => {
            if args.bmp.exists() && !force {
                return Err(StegError::Config(format!(
                    "{} already exists (use --force to overwrite)",
                    args.bmp.display()
                )));
            }
            container::create_carrier(&args.bmp, width, height)?;
            println!(
                "Created {} ({} bytes of payload space)",
                args.bmp.display(),
                container::capacity_for(width, height)
            );
            Ok(())
        }

        Commands::Ls { long } => {
            let mut store = open_read_only(&args.bmp)?;
            println!("Hidden files:");
            if long {
                let entries: Vec<_> = store.entries().cloned().collect();
                for entry in entries {
                    let crc = store.checksum(&entry.name)?;
                    println!(
                        "- {} ({} bytes) offset={} crc32={:08x}",
                        entry.display_name(), entry.size, entry.offset, crc
                    );
                }
            } else {
                for (name, size) in store.list() {
                    println!("- {} ({} bytes)", name, size);
                }
            }
            store.close()
        }

        Commands::Cat { name } => {
            let mut store = open_read_only(&args.bmp)?;
            let stdout = io::stdout();
            let mut out = stdout.lock();
            store.read_into(&name, &mut out)?;
            out.flush()?;
            store.close()
        }

        Commands::Write { name, text, from } => {
            let data = match (text, from) {
                (Some(text), _) => text.into_bytes(),
                (None, Some(path)) => std::fs::read(&path)?,
                (None, None) => {
                    return Err(StegError::Config("no content given".to_string()));
                }
            };
            let mut store = Store::open(&args.bmp)?;
            store.create(&name, &data)?;
            println!("File '{}' written.", name);
            store.close()
        }

        Commands::Delete { name } => {
            let mut store = Store::open(&args.bmp)?;
            store.delete(&name)?;
            println!("File '{}' deleted.", name);
            store.close()
        }

        Commands::Info => {
            let store = open_read_only(&args.bmp)?;
            let usage = store.usage();
            println!("Container:     {}", store.path().display());
            println!("Data start:    {}", usage.data_start);
            println!("Data size:     {} bytes", usage.data_size);
            println!("Payload start: {}", usage.payload_start);
            println!("High water:    {}", usage.high_water);
            println!("Free:          {} bytes", usage.free_bytes);
            println!("Files:         {}/{}", usage.file_count, usage.capacity);
            if store.directory().discarded() > 0 {
                println!("Discarded:     {} invalid entries", store.directory().discarded());
            }
            store.close()
        }
    }
}

fn open_read_only(path: &std::path::Path) -> Result<Store> {
    Store::open_with(path, StoreConfig::builder().read_only(true).build())
}

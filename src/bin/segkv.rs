//! SegKV CLI
//!
//! Command-line driver for a local SegKV data directory.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use segkv::segment::SegmentRecovery;
use segkv::{Config, SegKvError, Store};
use tracing_subscriber::{fmt, EnvFilter};

/// SegKV CLI
#[derive(Parser, Debug)]
#[command(name = "segkv")]
#[command(about = "Append-only log-structured key-value store")]
#[command(version)]
struct Args {
    /// Data directory (created if missing)
    #[arg(short, long, default_value = "./segkv_data")]
    data_dir: PathBuf,

    /// Active segment size in bytes before rotation
    #[arg(short, long, default_value = "10485760")]
    max_segment_bytes: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Put {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Print the size of the active segment
    Size,

    /// Scan the active segment and report what recovery would see
    Verify,

    /// Write a batch of large values, read them back, and list segment files
    Demo {
        /// Number of keys to write
        #[arg(short, long, default_value = "100")]
        count: usize,

        /// Size of each value in bytes
        #[arg(short, long, default_value = "500")]
        value_size: usize,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,segkv=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> segkv::Result<()> {
    // Directory management belongs to the caller, not the store
    fs::create_dir_all(&args.data_dir)?;

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .max_segment_bytes(args.max_segment_bytes)
        .build();

    if let Commands::Verify = args.command {
        let result = SegmentRecovery::verify(&config.active_segment_path())?;
        println!(
            "ok: {} records, {} keys, {} bytes",
            result.records_recovered, result.keys_indexed, result.end_offset
        );
        return Ok(());
    }

    let store = Store::open(config)?;
    tracing::debug!("SegKV v{}", segkv::VERSION);

    match args.command {
        Commands::Get { key } => match store.get(key.as_bytes()) {
            Ok(value) => println!("{}", String::from_utf8_lossy(&value)),
            Err(SegKvError::KeyNotFound) => println!("(not found)"),
            Err(e) => return Err(e),
        },
        Commands::Put { key, value } => {
            store.put(key.as_bytes(), value.as_bytes())?;
            println!("OK");
        }
        Commands::Size => println!("{}", store.size()?),
        Commands::Demo { count, value_size } => demo(&store, count, value_size)?,
        Commands::Verify => {}
    }

    store.close()
}

fn demo(store: &Store, count: usize, value_size: usize) -> segkv::Result<()> {
    let filler = "x".repeat(value_size);

    for i in 0..count {
        let key = format!("key{}", i);
        let value = format!("value{}_{}", i, filler);
        store.put(key.as_bytes(), value.as_bytes())?;
    }
    println!("wrote {} keys", count);

    let mut reachable = 0;
    for i in 0..count {
        let key = format!("key{}", i);
        match store.get(key.as_bytes()) {
            Ok(_) => reachable += 1,
            Err(SegKvError::KeyNotFound) => {}
            Err(e) => return Err(e),
        }
    }
    println!(
        "{} of {} keys reachable in the active segment ({} sealed segments)",
        reachable,
        count,
        store.sealed_segments().len()
    );

    let mut names: Vec<String> = fs::read_dir(store.data_dir())?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    println!("{} files:", names.len());
    for name in names {
        println!("  {}", name);
    }

    Ok(())
}

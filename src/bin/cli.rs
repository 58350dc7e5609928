//! fdfs-cli
//!
//! Command-line interface for uploading, downloading and deleting files.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use fdfs_client::config::DEFAULT_TRACKER_PORT;
use fdfs_client::{Client, Config, FileId, UploadSource};
use tracing_subscriber::{fmt, EnvFilter};

/// fdfs CLI
#[derive(Parser, Debug)]
#[command(name = "fdfs-cli")]
#[command(about = "CLI for tracker/storage distributed file systems")]
#[command(version)]
struct Args {
    /// Tracker host (repeat for several)
    #[arg(short, long = "tracker", default_value = "127.0.0.1")]
    trackers: Vec<String>,

    /// Tracker port
    #[arg(short, long, default_value_t = DEFAULT_TRACKER_PORT)]
    port: u16,

    /// Maximum pooled tracker connections
    #[arg(short, long, default_value = "8")]
    max_connections: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload a local file
    Upload {
        path: PathBuf,

        /// Extension to store (defaults to the file's own)
        #[arg(short, long, default_value = "")]
        ext: String,
    },

    /// Upload a slave file next to an existing master
    UploadSlave {
        path: PathBuf,

        /// Master remote id ("group/path")
        #[arg(long)]
        master: String,

        /// Prefix that names the slave
        #[arg(long)]
        prefix: String,

        #[arg(short, long, default_value = "")]
        ext: String,
    },

    /// Download a remote file
    Download {
        /// Remote id ("group/path")
        id: String,

        /// Local destination
        output: PathBuf,

        #[arg(long, default_value = "0")]
        offset: u64,

        /// Bytes to read (0 = to the end)
        #[arg(long, default_value = "0")]
        size: u64,
    },

    /// Delete a remote file
    Delete {
        /// Remote id ("group/path")
        id: String,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,fdfs_client=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .tracker_hosts(args.trackers.clone())
        .tracker_port(args.port)
        .max_connections(args.max_connections)
        .build();

    if let Err(e) = run(config, args.command) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(config: Config, command: Commands) -> fdfs_client::Result<()> {
    let client = Client::new(config)?;

    match command {
        Commands::Upload { path, ext } => {
            let uploaded = client.upload(UploadSource::Path(&path), &ext)?;
            println!("{}", uploaded);
        }
        Commands::UploadSlave {
            path,
            master,
            prefix,
            ext,
        } => {
            let master = FileId::parse(&master)?;
            let uploaded = client.upload_slave(UploadSource::Path(&path), &master, &prefix, &ext)?;
            println!("{}", uploaded);
        }
        Commands::Download {
            id,
            output,
            offset,
            size,
        } => {
            let file_id = FileId::parse(&id)?;
            let transferred = client.download(
                &file_id,
                fdfs_client::DownloadSink::Path(&output),
                offset,
                size,
            )?;
            println!("{} bytes -> {}", transferred, output.display());
        }
        Commands::Delete { id } => {
            let file_id = FileId::parse(&id)?;
            client.delete(&file_id)?;
            println!("deleted {}", file_id);
        }
    }

    client.close();
    Ok(())
}

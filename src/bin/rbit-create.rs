//! rbit-create CLI
//!
//! Creates a `.torrent` file from a file or directory.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Context};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use rbit_create::constants::DEFAULT_PIECE_SIZE;
use rbit_create::{
    estimate_piece_count, CreationRequest, CreationStatus, CreatorEvent, TorrentCreator,
};

/// Create a BitTorrent v1 torrent file
#[derive(Parser)]
#[command(name = "rbit-create")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// File or directory to share
    input: PathBuf,

    /// Output torrent file [default: <input name>.torrent]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Piece size in bytes
    #[arg(short, long, default_value_t = DEFAULT_PIECE_SIZE)]
    piece_size: u64,

    /// Tracker URL; repeat for more. Pass "" to start a new tier
    #[arg(short, long = "tracker", allow_hyphen_values = true)]
    trackers: Vec<String>,

    /// Web seed URL; repeat for more
    #[arg(short, long = "web-seed")]
    web_seeds: Vec<String>,

    /// Comment stored in the torrent
    #[arg(short, long, default_value = "")]
    comment: String,

    /// Source tag stored in the info dictionary
    #[arg(short, long, default_value = "")]
    source: String,

    /// Mark the torrent private
    #[arg(long)]
    private: bool,

    /// Record the current time as the creation date
    #[arg(long)]
    date: bool,

    /// Only print how many pieces the input would have
    #[arg(long)]
    estimate: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if cli.estimate {
        let pieces = estimate_piece_count(&cli.input, cli.piece_size).await?;
        println!("{pieces}");
        return Ok(());
    }

    let output = match cli.output.clone() {
        Some(output) => output,
        None => default_output(&cli.input)?,
    };

    let mut request = CreationRequest::new(&cli.input, &output)
        .piece_size(cli.piece_size)
        .trackers(cli.trackers)
        .url_seeds(cli.web_seeds)
        .comment(cli.comment)
        .source(cli.source)
        .private(cli.private);
    if cli.date {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("system clock is before the Unix epoch")?;
        request = request.creation_date(i64::try_from(now.as_secs())?);
    }

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{msg} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}%")?
            .progress_chars("#>-"),
    );
    bar.set_message(format!("Hashing {}", cli.input.display()));

    let creator = TorrentCreator::new();
    let mut handle = creator.create(request)?;
    let cancel = handle.cancellation_token();

    let mut ctrl_c = std::pin::pin!(tokio::signal::ctrl_c());
    let mut interrupted = false;
    loop {
        tokio::select! {
            event = handle.next_event() => match event {
                Some(CreatorEvent::Progress(percent)) => bar.set_position(u64::from(percent)),
                Some(CreatorEvent::Created(created)) => {
                    bar.finish_with_message(format!("Created {}", created.output_path.display()));
                }
                Some(CreatorEvent::Failed { message, .. }) => {
                    bar.abandon_with_message(format!("Failed: {message}"));
                }
                None => break,
            },
            _ = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                bar.set_message("Cancelling");
                cancel.cancel();
            }
        }
    }

    match handle.join().await? {
        CreationStatus::Created(created) => {
            println!("info hash:  {}", created.info_hash);
            println!("pieces:     {}", created.piece_count);
            println!("total size: {} bytes", created.total_length);
            Ok(())
        }
        CreationStatus::Cancelled => {
            bar.abandon_with_message("Cancelled");
            Err(anyhow!("torrent creation cancelled"))
        }
    }
}

fn default_output(input: &Path) -> anyhow::Result<PathBuf> {
    let name = input
        .file_name()
        .ok_or_else(|| anyhow!("cannot derive a torrent name from {}", input.display()))?;
    let mut file_name = name.to_os_string();
    file_name.push(".torrent");
    Ok(PathBuf::from(file_name))
}

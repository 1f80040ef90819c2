//! synclink CLI - Command line interface for remote transfer operations.
//!
//! Loads backend settings from a JSON file and runs capability probes or a
//! single transfer operation against the configured target.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use synclink_common::{RemoteFile, RemoteFileType};
use synclink_storage::create_default_registry;
use synclink_transfer::{StoreTransferManager, TransferManager, TransferSettings};

#[derive(Parser)]
#[command(name = "synclink")]
#[command(about = "synclink - Remote storage transfer tool")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Path to the JSON settings file.
    #[arg(short, long, default_value = "synclink.json")]
    settings: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Remote file address.
#[derive(Args)]
struct RemoteArgs {
    /// Remote file type (multichunk, database, cleanup, action, transaction, temp, repo).
    #[arg(short = 't', long = "type")]
    kind: RemoteFileType,

    /// Simple name, without namespace prefix.
    #[arg(short, long)]
    name: String,
}

impl RemoteArgs {
    fn to_remote_file(&self) -> Result<RemoteFile> {
        RemoteFile::new(self.kind, self.name.as_str())
            .with_context(|| format!("Invalid remote file name: {}", self.name))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run all capability probes against the target.
    Probe,

    /// Upload a local file.
    Upload {
        /// Local file to upload.
        #[arg(short, long)]
        source: PathBuf,

        #[command(flatten)]
        remote: RemoteArgs,
    },

    /// Download a remote file.
    Download {
        #[command(flatten)]
        remote: RemoteArgs,

        /// Destination file path.
        #[arg(short, long)]
        dest: PathBuf,
    },

    /// Delete a remote file.
    Delete {
        #[command(flatten)]
        remote: RemoteArgs,
    },

    /// Move a remote file.
    Move {
        /// Source type.
        #[arg(long)]
        from_type: RemoteFileType,

        /// Source simple name.
        #[arg(long)]
        from_name: String,

        /// Target type.
        #[arg(long)]
        to_type: RemoteFileType,

        /// Target simple name.
        #[arg(long)]
        to_name: String,
    },

    /// List remote files of one type.
    List {
        /// Remote file type.
        #[arg(short = 't', long = "type")]
        kind: RemoteFileType,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut manager = open_manager(&cli.settings).await?;

    let result = match cli.command {
        Commands::Probe => cmd_probe(&manager).await,

        Commands::Upload { source, remote } => cmd_upload(&manager, &source, &remote).await,

        Commands::Download { remote, dest } => cmd_download(&manager, &remote, &dest).await,

        Commands::Delete { remote } => cmd_delete(&manager, &remote).await,

        Commands::Move {
            from_type,
            from_name,
            to_type,
            to_name,
        } => {
            let source = RemoteArgs {
                kind: from_type,
                name: from_name,
            };
            let target = RemoteArgs {
                kind: to_type,
                name: to_name,
            };
            cmd_move(&manager, &source, &target).await
        }

        Commands::List { kind } => cmd_list(&manager, kind).await,
    };

    manager.disconnect().await?;
    result
}

/// Build a transfer manager from the settings file.
async fn open_manager(settings_path: &Path) -> Result<StoreTransferManager> {
    let settings = TransferSettings::from_file(settings_path)
        .await
        .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;

    let registry = create_default_registry();
    let manager = StoreTransferManager::new(settings, &registry)?;
    Ok(manager)
}

/// Run every probe and report the results.
async fn cmd_probe(manager: &StoreTransferManager) -> Result<()> {
    info!("Probing provider '{}'", manager.provider());

    let exists = manager.test_target_exists().await;
    let can_write = manager.test_target_can_write().await;
    let can_create = manager.test_target_can_create().await;
    let repo_exists = manager.test_repo_file_exists().await;

    println!("Target exists:      {}", exists);
    println!("Target can write:   {}", can_write);
    println!("Target can create:  {}", can_create);
    println!("Repo file exists:   {}", repo_exists);

    if exists {
        let extension = manager.read_after_write().await?;
        let mode = if extension.is_strong() {
            "strong"
        } else {
            "listing check"
        };
        println!("Read-after-write:   {}", mode);
    }

    Ok(())
}

/// Upload a local file.
async fn cmd_upload(
    manager: &StoreTransferManager,
    source: &Path,
    remote: &RemoteArgs,
) -> Result<()> {
    let file = remote.to_remote_file()?;
    manager.upload(source, &file).await?;
    info!("Uploaded {} to {}", source.display(), file.remote_path());
    Ok(())
}

/// Download a remote file.
async fn cmd_download(
    manager: &StoreTransferManager,
    remote: &RemoteArgs,
    dest: &Path,
) -> Result<()> {
    let file = remote.to_remote_file()?;
    manager.download(&file, dest).await?;
    info!("Downloaded {} to {}", file.remote_path(), dest.display());
    Ok(())
}

/// Delete a remote file.
async fn cmd_delete(manager: &StoreTransferManager, remote: &RemoteArgs) -> Result<()> {
    let file = remote.to_remote_file()?;
    manager.delete(&file).await?;
    info!("Deleted {}", file.remote_path());
    Ok(())
}

/// Move a remote file.
async fn cmd_move(
    manager: &StoreTransferManager,
    source: &RemoteArgs,
    target: &RemoteArgs,
) -> Result<()> {
    let source = source.to_remote_file()?;
    let target = target.to_remote_file()?;

    if let Err(e) = manager.move_file(&source, &target).await {
        if e.is_possible_duplicate() {
            eprintln!(
                "Warning: {} and {} may both exist on the target",
                source.remote_path(),
                target.remote_path()
            );
        }
        return Err(e.into());
    }

    info!("Moved {} to {}", source.remote_path(), target.remote_path());
    Ok(())
}

/// List remote files of one type.
async fn cmd_list(manager: &StoreTransferManager, kind: RemoteFileType) -> Result<()> {
    let files = manager.list(kind).await?;

    if files.is_empty() {
        println!("(no {} files)", kind);
        return Ok(());
    }

    let mut names: Vec<_> = files.keys().collect();
    names.sort();
    for name in names {
        println!("{}", name);
    }
    Ok(())
}

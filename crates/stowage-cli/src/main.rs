//! stowage: command-line client for the upload backend.
//!
//! Drives the same widget flows as the browser component: fetch a
//! signed credential, post files straight to the storage host, register
//! them, and list or remove stored objects.
//!
//! # Usage
//!
//! ```text
//! stowage [--api-url URL] [--type TYPE] [--user NAME] [--admin] [--dev] <COMMAND>
//! stowage --user alice --type image upload cat.png dog.jpg
//! stowage list
//! stowage --admin remove <OBJECT_ID>
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `warn`).

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use stowage_core::{
    Endpoints, LocalFile, Notice, NoticeLevel, Observer, ResourceType, Session, UuidKeys, Widget,
};
use stowage_io::HttpTransport;
use stowage_io::components::format_size;
use tracing_subscriber::EnvFilter;

/// Upload, list and remove objects through a stowage backend.
#[derive(Parser)]
#[command(name = "stowage", version)]
struct Cli {
    /// Backend origin serving `/api/*`.
    #[arg(
        long,
        global = true,
        env = "STOWAGE_API_URL",
        default_value = "http://localhost:3000"
    )]
    api_url: String,

    /// Resource type to work with (file, image, video, audio, ...).
    #[arg(long = "type", global = true, default_value = "file")]
    resource: ResourceType,

    /// Logged-in user name.
    #[arg(long, global = true)]
    user: Option<String>,

    /// Act as an administrator.
    #[arg(long, global = true)]
    admin: bool,

    /// Development mode: allow credentials without a user.
    #[arg(long, global = true)]
    dev: bool,

    /// Request timeout in seconds.
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List stored objects of the selected type.
    List,
    /// Upload files and register them with the backend.
    Upload {
        /// Files to upload.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Remove a stored object by its id.
    Remove {
        /// `objectId` as shown by `list`.
        object_id: String,
    },
}

impl Cli {
    fn session(&self) -> Session {
        Session {
            user: self.user.clone().filter(|u| !u.is_empty()),
            is_admin: self.admin,
            is_dev: self.dev,
        }
    }
}

/// Prints notices to stderr as they arrive.
struct StderrObserver;

impl Observer for StderrObserver {
    fn notify(&self, notice: Notice) {
        let tag = match notice.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        eprintln!("{tag}: {}", notice.message);
    }
}

type CliWidget = Widget<HttpTransport, UuidKeys, StderrObserver>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(cli.timeout))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error building HTTP client: {e}");
            return ExitCode::FAILURE;
        }
    };

    let widget = Widget::new(
        HttpTransport::with_client(client),
        Endpoints::new(cli.api_url.clone()),
        cli.session(),
        cli.resource.clone(),
    )
    .with_observer(StderrObserver);

    let ok = match &cli.command {
        Command::List => list(&widget).await,
        Command::Upload { files } => upload(&widget, files).await,
        Command::Remove { object_id } => widget.remove(object_id).await.is_ok(),
    };

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[allow(clippy::future_not_send)] // the widget is single-threaded
async fn list(widget: &CliWidget) -> bool {
    if widget.load_list().await.is_err() {
        return false;
    }
    let state = widget.state();
    if state.items().is_empty() {
        eprintln!("No {} objects.", state.resource());
        return true;
    }
    for item in state.items() {
        let link = item.url.as_deref().unwrap_or(&item.key);
        println!(
            "{}\t{}\t{}\t{link}",
            item.object_id,
            format_size(item.size),
            item.name
        );
    }
    true
}

#[allow(clippy::future_not_send)]
async fn upload(widget: &CliWidget, paths: &[PathBuf]) -> bool {
    if !widget.session().can_sign() {
        eprintln!("error: uploading needs --user or --dev");
        return false;
    }
    if widget.load_credential().await.is_err() {
        return false;
    }

    let mut ok = true;
    for path in paths {
        let file = match read_file(path).await {
            Ok(file) => file,
            Err(e) => {
                eprintln!("Error reading {}: {e}", path.display());
                ok = false;
                continue;
            }
        };
        ok &= widget.upload_file(file).await.is_ok();
    }
    ok
}

async fn read_file(path: &Path) -> std::io::Result<LocalFile> {
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(LocalFile::from_name(name, bytes))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_build_the_session() {
        let cli = Cli::parse_from(["stowage", "--user", "ada", "--admin", "--type", "image", "list"]);
        let session = cli.session();
        assert_eq!(session.user.as_deref(), Some("ada"));
        assert!(session.can_remove());
        assert!(!session.is_dev);
        assert_eq!(cli.resource, ResourceType::Image);
    }

    #[test]
    fn empty_user_is_anonymous() {
        let cli = Cli::parse_from(["stowage", "--user", "", "list"]);
        assert!(!cli.session().is_logged_in());
    }

    #[test]
    fn upload_needs_files() {
        assert!(Cli::try_parse_from(["stowage", "upload"]).is_err());
    }
}

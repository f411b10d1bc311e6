//! `mdd`: command-line client for the MDD developer community.
//!
//! # Usage
//!
//! ```text
//! mdd login alice@example.com
//! mdd posts --asc
//! mdd post 12
//! MDD_BASE_URL=https://mdd.example.com mdd subjects
//! ```

mod app;
mod render;
mod settings;

use std::path::PathBuf;

use app::App;
use clap::{Parser, Subcommand};
use mdd_core::{PostId, SubjectId};
use mdd_session::Route;
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "mdd", version, about = "Command-line client for the MDD developer community")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "mdd.toml")]
  config: PathBuf,

  /// Base URL of the API server (overrides config and `MDD_BASE_URL`).
  #[arg(long)]
  base_url: Option<String>,

  /// Keep the session in memory only; nothing is read from or written to disk.
  #[arg(long)]
  ephemeral: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Log in and remember the session.
  Login {
    email:    String,
    /// Read from stdin when omitted.
    #[arg(long, env = "MDD_PASSWORD", hide_env_values = true)]
    password: Option<String>,
  },
  /// Create an account.
  Register {
    email:     String,
    user_name: String,
    #[arg(long, env = "MDD_PASSWORD", hide_env_values = true)]
    password:  Option<String>,
  },
  /// Forget the session.
  Logout,
  /// Show who is logged in.
  Whoami,
  /// List posts, newest first.
  Posts {
    /// Oldest first.
    #[arg(long)]
    asc: bool,
  },
  /// Show a post with its comments.
  Post { id: PostId },
  /// Comment on a post.
  Comment { post: PostId, text: String },
  /// Publish a post.
  NewPost {
    #[arg(long)]
    subject:     SubjectId,
    #[arg(long)]
    title:       String,
    #[arg(long)]
    description: String,
  },
  /// Edit a post; omitted fields keep their current value.
  EditPost {
    id:          PostId,
    #[arg(long)]
    subject:     Option<SubjectId>,
    #[arg(long)]
    title:       Option<String>,
    #[arg(long)]
    description: Option<String>,
  },
  /// List subjects and which ones you follow.
  Subjects,
  Follow { id: SubjectId },
  Unfollow { id: SubjectId },
  /// Show your account and subscriptions.
  Profile,
  /// Change your name or email; omitted fields keep their current value.
  UpdateProfile {
    #[arg(long)]
    user_name: Option<String>,
    #[arg(long)]
    email:     Option<String>,
    #[arg(long, env = "MDD_PASSWORD", hide_env_values = true)]
    password:  Option<String>,
  },
}

impl Command {
  /// The view this command opens, for the route guard.
  pub fn route(&self) -> Route {
    match self {
      Command::Login { .. } => Route::Login,
      Command::Register { .. } => Route::Register,
      Command::Logout | Command::Whoami => Route::Home,
      Command::Posts { .. } => Route::Posts,
      Command::Post { id } => Route::PostDetail(*id),
      Command::Comment { post, .. } => Route::PostDetail(*post),
      Command::NewPost { .. } => Route::PostForm(None),
      Command::EditPost { id, .. } => Route::PostForm(Some(*id)),
      Command::Subjects | Command::Follow { .. } | Command::Unfollow { .. } => Route::Subjects,
      Command::Profile | Command::UpdateProfile { .. } => Route::Profile,
    }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let mut settings = Settings::load(&cli.config)?;
  if let Some(url) = cli.base_url {
    settings.base_url = url;
  }

  let app = App::build(&settings, cli.ephemeral).await?;
  let outcome = app.run(cli.command).await;

  if let Err(e) = &outcome
    && e
      .downcast_ref::<mdd_core::Error>()
      .is_some_and(mdd_core::Error::requires_login)
  {
    eprintln!("hint: run `mdd login <email>` to start a new session");
  }
  outcome
}

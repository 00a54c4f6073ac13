//! `rollcall` — admin CLI for the school personnel registry.
//!
//! # Usage
//!
//! ```
//! rollcall --url http://localhost:7070 list
//! rollcall --config ~/.config/rollcall/config.toml link t-42 u-9
//! rollcall provision --username arahman --email ar@school.edu
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rollcall_core::{
  provision::NewAccount,
  record::{RecordId, Role},
  service::PersonnelService,
  store::{AccountStore as _, DirectoryStore as _},
  unified::RoleFilter,
};
use rollcall_store_http::{RemoteConfig, RemoteStore};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "rollcall", about = "Admin CLI for the school personnel registry")]
struct Args {
  /// Path to a TOML config file (url, username, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the admin API (default: http://localhost:7070).
  #[arg(long, env = "ROLLCALL_URL")]
  url: Option<String>,

  /// API username.
  #[arg(long, env = "ROLLCALL_USER")]
  user: Option<String>,

  /// API password (plaintext).
  #[arg(long, env = "ROLLCALL_PASSWORD")]
  password: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Show the unified personnel view.
  List {
    /// Single role name, or "any"; defaults to Teacher-like records.
    #[arg(long)]
    role: Option<String>,

    /// Substring filter over name and email.
    #[arg(long)]
    query: Option<String>,
  },

  /// Show the records still eligible for linking.
  Eligible,

  /// Bind a directory record to an account.
  Link { teacher_id: String, user_id: String },

  /// Create an account; prints the one-time credential when generated.
  Provision {
    #[arg(long)]
    username: String,

    #[arg(long, default_value = "teacher")]
    role: String,

    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    phone: Option<String>,

    /// Explicit password; omit to have the store generate one.
    #[arg(long)]
    password: Option<String>,

    /// Create the account in the inactive state.
    #[arg(long)]
    inactive: bool,
  },

  /// Reissue a one-time credential for an account.
  ResetPassword { user_id: String },

  /// Delete a directory record.
  DeleteTeacher { teacher_id: String },

  /// Delete an account.
  DeleteUser { user_id: String },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  username: String,
  #[serde(default)]
  password: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let remote_config = RemoteConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:7070".to_string()),
    username: args
      .user
      .or_else(|| {
        (!file_cfg.username.is_empty()).then(|| file_cfg.username.clone())
      })
      .unwrap_or_default(),
    password: args
      .password
      .or_else(|| {
        (!file_cfg.password.is_empty()).then(|| file_cfg.password.clone())
      })
      .unwrap_or_default(),
  };

  let store = RemoteStore::new(remote_config)?;
  let service = PersonnelService::new(store.clone(), store);

  match args.command {
    Command::List { role, query } => list(&service, role, query).await,
    Command::Eligible => eligible(&service).await,
    Command::Link {
      teacher_id,
      user_id,
    } => link(&service, teacher_id, user_id).await,
    Command::Provision {
      username,
      role,
      email,
      phone,
      password,
      inactive,
    } => {
      provision(&service, username, role, email, phone, password, inactive)
        .await
    }
    Command::ResetPassword { user_id } => {
      reset_password(&service, user_id).await
    }
    Command::DeleteTeacher { teacher_id } => {
      service
        .directory()
        .delete_teacher(RecordId::new(teacher_id))
        .await?;
      println!("deleted");
      Ok(())
    }
    Command::DeleteUser { user_id } => {
      service
        .accounts()
        .delete_account(RecordId::new(user_id))
        .await?;
      println!("deleted");
      Ok(())
    }
  }
}

// ─── Commands ─────────────────────────────────────────────────────────────────

type Service = PersonnelService<RemoteStore, RemoteStore>;

fn parse_filter(role: Option<String>) -> Result<RoleFilter> {
  match role.as_deref() {
    None => Ok(RoleFilter::TeacherLike),
    Some("any") => Ok(RoleFilter::Any),
    Some(raw) => {
      let role: Role = raw
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown role {raw:?}"))?;
      Ok(RoleFilter::Roles(vec![role]))
    }
  }
}

async fn list(
  service: &Service,
  role: Option<String>,
  query: Option<String>,
) -> Result<()> {
  let filter = parse_filter(role)?;
  let views = service
    .search_personnel(&filter, query.as_deref().unwrap_or(""))
    .await?;

  println!("{:<28} {:<10} {:<28} KEY", "NAME", "SOURCE", "EMAIL");
  for view in &views {
    println!(
      "{:<28} {:<10} {:<28} {}",
      view.display_name,
      view.provenance,
      view.contact_email.as_deref().unwrap_or("-"),
      view.identity_key,
    );
  }
  println!("{} entries", views.len());
  Ok(())
}

async fn eligible(service: &Service) -> Result<()> {
  let pools = service.eligible_pools().await?;

  println!("Unlinked teacher records:");
  for teacher in &pools.teachers {
    println!(
      "  {:<12} {:<28} {}",
      teacher.id,
      teacher.full_name,
      teacher.contact_email.as_deref().unwrap_or("-"),
    );
  }
  println!("Unlinked teacher accounts:");
  for account in &pools.accounts {
    println!(
      "  {:<12} {:<28} {}",
      account.id,
      account.username,
      account.email.as_deref().unwrap_or("-"),
    );
  }
  Ok(())
}

async fn link(
  service: &Service,
  teacher_id: String,
  user_id: String,
) -> Result<()> {
  let outcome = service
    .link(RecordId::new(teacher_id), RecordId::new(user_id))
    .await?;
  println!(
    "linked teacher {} to account {}",
    outcome.result.teacher_id, outcome.result.account_id,
  );
  println!(
    "{} teacher record(s) and {} account(s) remain eligible",
    outcome.eligible.teachers.len(),
    outcome.eligible.accounts.len(),
  );
  Ok(())
}

async fn provision(
  service: &Service,
  username: String,
  role: String,
  email: Option<String>,
  phone: Option<String>,
  password: Option<String>,
  inactive: bool,
) -> Result<()> {
  let role: Role = role
    .parse()
    .map_err(|_| anyhow::anyhow!("unknown role {role:?}"))?;
  let input = NewAccount {
    email,
    phone,
    password,
    is_active: inactive.then_some(false),
    ..NewAccount::new(username, role)
  };

  let provisioned = service.provision(input).await?;
  println!(
    "created account {} ({})",
    provisioned.account.id, provisioned.account.username,
  );
  if let Some(temp) = &provisioned.temp_password {
    // Shown exactly once; the store never exposes it again.
    println!("temporary password: {temp}");
  }
  Ok(())
}

async fn reset_password(service: &Service, user_id: String) -> Result<()> {
  let temp = service.reset_password(RecordId::new(user_id)).await?;
  // Shown exactly once; the store never exposes it again.
  println!("temporary password: {temp}");
  Ok(())
}

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{info, warn};

use lenorefin_client::api::accounts::AccountType;
use lenorefin_client::{config, Session};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Wait until the backend answers its health check
    Health,
    /// List accounts, optionally filtered by type
    Accounts {
        #[arg(long = "type", value_enum, default_value_t = Kind::All)]
        kind: Kind,
    },
    /// List one page of transactions
    Transactions {
        #[arg(long)]
        account: Option<i64>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        page_size: u32,
    },
    /// List reminders
    Reminders,
    /// Delete a reminder by id
    DeleteReminder { id: i64 },
    /// Upload a bank export using a JSON column mapping
    Import {
        #[arg(long)]
        mappings: PathBuf,
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum Kind {
    All,
    CreditCard,
    Checking,
    Savings,
    Investment,
    Loan,
}

impl From<Kind> for AccountType {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::All => AccountType::All,
            Kind::CreditCard => AccountType::CreditCard,
            Kind::Checking => AccountType::Checking,
            Kind::Savings => AccountType::Savings,
            Kind::Investment => AccountType::Investment,
            Kind::Loan => AccountType::Loan,
        }
    }
}

fn print(value: Option<Value>) -> Result<()> {
    match value {
        Some(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        None => bail!("request failed"),
    }
}

async fn run(session: &Session, command: Command) -> Result<()> {
    match command {
        Command::Health => {
            if !session.wait_until_ready().await {
                bail!("backend did not become ready");
            }
            session.version().prefetch().await;
            print(session.version().get().await)
        }
        Command::Accounts { kind } => print(session.accounts().list(kind.into()).await),
        Command::Transactions {
            account,
            page,
            page_size,
        } => {
            session.pageinfo().update(|info| {
                info.account_id = account;
                info.page = Some(page);
                info.page_size = Some(page_size);
            });
            print(session.transactions().list().await)
        }
        Command::Reminders => print(session.reminders().list().await),
        Command::DeleteReminder { id } => {
            let value = session.reminders().delete(id).await?;
            print(Some(value))
        }
        Command::Import { mappings, file } => {
            let mappings: Value = serde_json::from_slice(
                &tokio::fs::read(&mappings)
                    .await
                    .with_context(|| format!("reading {}", mappings.display()))?,
            )?;
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "import".to_string());
            let value = session
                .file_import()
                .upload(&mappings, &file_name, bytes)
                .await?;
            print(Some(value))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;
    let session = Session::from_config(&cfg)?;

    let outcome = run(&session, args.command).await;

    if let Some(note) = session.notifications().visible() {
        info!(text = %note.text, color = %note.color, "notification");
    }
    match session.flush_audit().await {
        Ok(sent) => info!(sent, "audit log flushed"),
        Err(err) => warn!(?err, "audit flush failed"),
    }
    outcome
}

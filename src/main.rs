use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use nurture::api::{ApiClient, ComplimentApi, EmailRequest};
use nurture::config::Settings;
use nurture::contract::{self, ContractOptions};
use nurture::controller::CapabilityReporter;
use nurture::form::{FormEvent, Relationship, Tone};
use nurture::page::ComposerPage;
use nurture::shell::display::{display_contract, display_status, print_compliment};
use nurture::shell::run_shell;

/// Compose heartfelt compliments with an LLM backend and email them.
#[derive(Parser, Debug)]
#[command(name = "nurture", version, about)]
struct Cli {
    /// Backend base URL (overrides config and NURTURE_API__BASE_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive composer (the default)
    Shell,
    /// Generate one compliment and optionally email it
    Generate {
        #[arg(long)]
        name: String,
        #[arg(long, value_enum)]
        relationship: Relationship,
        /// Repeat for each quality
        #[arg(long = "quality", required = true)]
        qualities: Vec<String>,
        #[arg(long)]
        context: Option<String>,
        #[arg(long, value_enum, default_value_t = Tone::Warm)]
        tone: Tone,
        /// Email the compliment to this address
        #[arg(long)]
        email_to: Option<String>,
        /// Sender name for the email
        #[arg(long, requires = "email_to")]
        sender: Option<String>,
    },
    /// Show LLM, email and model availability
    Status {
        /// Keep refreshing; seconds between checks default to health.watch_interval_secs
        #[arg(long)]
        watch: Option<Option<u64>>,
    },
    /// Email an existing compliment
    SendEmail {
        #[arg(long)]
        to: String,
        /// Recipient's name
        #[arg(long)]
        name: String,
        #[arg(long)]
        sender: Option<String>,
        #[arg(long)]
        compliment: String,
    },
    /// Check a running backend against the HTTP contract
    Contract {
        #[arg(long)]
        skip_generate: bool,
        #[arg(long)]
        skip_email: bool,
        /// Recipient used by the email check
        #[arg(long)]
        probe_email: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load settings first
    let settings = Settings::new()?.with_api_url(cli.api_url)?;

    // Logs go to a file so the terminal stays clean for the shell
    std::fs::create_dir_all(&settings.logging.directory)
        .with_context(|| format!("creating log directory {}", settings.logging.directory.display()))?;
    let file_appender = tracing_appender::rolling::RollingFileAppender::new(
        tracing_appender::rolling::Rotation::DAILY,
        &settings.logging.directory,
        "nurture",
    );
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_line_number(true)
        .with_file(true)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.logging.level)),
        )
        .init();

    info!("Nurture starting up...");
    let full_log_path = std::fs::canonicalize(&settings.logging.directory)?;
    info!("Log directory: {}", full_log_path.display());

    let api = ApiClient::from_config(&settings.api)?;

    let result = match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => run_shell(&settings, &api).await,
        Commands::Generate {
            name,
            relationship,
            qualities,
            context,
            tone,
            email_to,
            sender,
        } => {
            let mut page = ComposerPage::new(&settings.email.default_sender);
            page.apply(FormEvent::RecipientNameChanged(name));
            page.apply(FormEvent::RelationshipSelected(Some(relationship)));
            for quality in qualities {
                page.apply(FormEvent::QualityAdded(quality));
            }
            if let Some(context) = context {
                page.apply(FormEvent::ContextChanged(context));
            }
            page.apply(FormEvent::ToneSelected(Some(tone)));
            generate_once(&api, &mut page, email_to, sender).await
        }
        Commands::Status { watch } => status(&settings, &api, watch).await,
        Commands::SendEmail {
            to,
            name,
            sender,
            compliment,
        } => {
            let request = EmailRequest {
                recipient_email: to,
                recipient_name: name,
                sender_name: sender.unwrap_or_else(|| settings.email.default_sender.clone()),
                compliment,
            };
            let message = api
                .send_email(&request)
                .await
                .and_then(|response| response.into_delivery())
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("{}", message.green());
            Ok(())
        }
        Commands::Contract {
            skip_generate,
            skip_email,
            probe_email,
        } => {
            let options = ContractOptions {
                skip_generate,
                skip_email,
                probe_email,
            };
            println!("Checking {}", api.base_url());
            let checks = contract::run(&api, &options).await;
            display_contract(&checks);
            if checks.iter().any(|c| c.failed()) {
                bail!("backend does not satisfy the contract");
            }
            Ok(())
        }
    };

    if let Err(e) = &result {
        error!("Exiting with error: {:#}", e);
    }
    result
}

async fn generate_once(
    api: &ApiClient,
    page: &mut ComposerPage,
    email_to: Option<String>,
    sender: Option<String>,
) -> Result<()> {
    if !page.can_submit() {
        bail!("missing: {}", page.form().missing_fields().join(", "));
    }

    let generated = tokio::select! {
        generated = page.submit(api) => generated.map_err(|e| anyhow::anyhow!(e.user_message()))?,
        _ = tokio::signal::ctrl_c() => bail!("interrupted"),
    };
    print_compliment(generated);

    let Some(address) = email_to else {
        return Ok(());
    };
    let draft = page.email_draft_mut();
    draft.set_recipient_email(address);
    if let Some(sender) = sender {
        draft.set_sender_name(sender);
    }
    let message = page
        .send_email(api)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    println!("{}", message.green());
    Ok(())
}

async fn status(settings: &Settings, api: &ApiClient, watch: Option<Option<u64>>) -> Result<()> {
    let mut reporter = CapabilityReporter::new();
    let Some(interval) = watch else {
        reporter.refresh(api).await;
        display_status(&reporter);
        return Ok(());
    };

    let secs = interval.unwrap_or(settings.health.watch_interval_secs).max(1);
    println!("Refreshing every {}s, Ctrl-C to stop", secs);
    tokio::select! {
        _ = reporter.watch(api, Duration::from_secs(secs), None, display_status) => {}
        _ = tokio::signal::ctrl_c() => info!("Status watch stopped"),
    }
    Ok(())
}

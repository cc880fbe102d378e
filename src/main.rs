//! Wiring & DI. Entry point: parse the CLI, bootstrap adapters, inject into
//! the notification manager. No business logic here.

use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use trend_notify::adapters::email::{LettreMailTransport, TcpProbe};
use trend_notify::adapters::mock::{MockMailTransport, MockProbe, MockSessionProvider};
use trend_notify::adapters::telegram::{
    GrammersAuthAdapter, GrammersSessionProvider, connect_client,
};
use trend_notify::adapters::ui::InquireLoginPrompt;
use trend_notify::ports::{
    AuthPort, ConnectivityProbe, MailTransport, NotificationChannel, NotificationPort,
    SessionProvider,
};
use trend_notify::shared::AppConfig;
use trend_notify::usecases::{AuthService, ChatChannel, EmailChannel, NotificationManager};

#[derive(Debug, Parser)]
#[command(name = "trend-notify", version, about = "Deliver trend reports by email and chat")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Dispatch a notification over the configured channels.
    Send(SendArgs),
    /// Authorize the chat session interactively.
    Login,
    /// Check DNS and TCP reachability of the configured SMTP server.
    Probe,
}

#[derive(Debug, Args)]
struct SendArgs {
    #[arg(long)]
    subject: String,
    /// HTML body.
    #[arg(long, conflicts_with = "body_file", required_unless_present = "body_file")]
    body: Option<String>,
    /// Read the HTML body from a file.
    #[arg(long)]
    body_file: Option<PathBuf>,
    /// Attachment path; repeatable. `.csv` files are rendered as reports on chat.
    #[arg(long = "attach")]
    attachments: Vec<PathBuf>,
    /// Use in-memory adapters; nothing leaves the process.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!("no .env found (check CWD)"),
    }

    let cli = Cli::parse();
    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "configuration could not be loaded; using defaults");
        AppConfig::default()
    });

    match cli.command {
        Command::Send(args) => send(&cfg, args).await,
        Command::Login => login(&cfg).await.map(|_| ExitCode::SUCCESS),
        Command::Probe => probe(&cfg).await,
    }
}

async fn send(cfg: &AppConfig, args: SendArgs) -> anyhow::Result<ExitCode> {
    let body = match (args.body, &args.body_file) {
        (Some(body), _) => body,
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| anyhow::anyhow!("read body file {}: {}", path.display(), e))?,
        (None, None) => anyhow::bail!("pass --body or --body-file"),
    };

    let method = cfg.method_or_default();
    let mut manager = NotificationManager::new(method);

    if method.sends_email() {
        match cfg.email_settings() {
            Ok(settings) => {
                let (transport, probe): (Arc<dyn MailTransport>, Arc<dyn ConnectivityProbe>) =
                    if args.dry_run {
                        (Arc::new(MockMailTransport::new()), Arc::new(MockProbe::new()))
                    } else {
                        (
                            Arc::new(LettreMailTransport::new(settings.timeout)),
                            Arc::new(TcpProbe::new(cfg.probe_timeout())),
                        )
                    };
                let channel: Arc<dyn NotificationChannel> =
                    Arc::new(EmailChannel::new(settings, transport, probe));
                manager = manager.with_email(channel);
            }
            Err(e) => error!(error = %e, "email channel not configured"),
        }
    }

    if method.sends_chat() {
        match cfg.chat_settings() {
            Ok(settings) => {
                let session: Option<Arc<dyn SessionProvider>> = if args.dry_run {
                    Some(Arc::new(MockSessionProvider::new([settings.receiver.clone()]))
                        as Arc<dyn SessionProvider>)
                } else {
                    match connect_client(cfg.api_id.unwrap_or(0), &cfg.session_path_or_default())
                        .await
                    {
                        Ok(client) => Some(Arc::new(GrammersSessionProvider::new(client))
                            as Arc<dyn SessionProvider>),
                        Err(e) => {
                            error!(error = %e, "chat client could not be created");
                            None
                        }
                    }
                };
                if let Some(session) = session {
                    let channel: Arc<dyn NotificationChannel> =
                        Arc::new(ChatChannel::new(session, settings));
                    manager = manager.with_chat(channel);
                }
            }
            Err(e) => error!(error = %e, "chat channel not configured"),
        }
    }

    if args.dry_run {
        info!(method = %method, "dry run: using in-memory adapters");
    }

    let port: &dyn NotificationPort = &manager;
    if port
        .send_notification(&args.subject, &body, &args.attachments)
        .await
    {
        info!("notification delivered");
        Ok(ExitCode::SUCCESS)
    } else {
        error!("notification delivery failed");
        Ok(ExitCode::FAILURE)
    }
}

async fn login(cfg: &AppConfig) -> anyhow::Result<()> {
    let api_hash = cfg.api_hash.clone().unwrap_or_default();
    if api_hash.is_empty() {
        anyhow::bail!("Set NOTIFY_API_HASH (env or .env). Get from https://my.telegram.org");
    }
    let client = connect_client(cfg.api_id.unwrap_or(0), &cfg.session_path_or_default()).await?;
    let auth: Arc<dyn AuthPort> = Arc::new(GrammersAuthAdapter::new(client, api_hash));
    AuthService::new(auth)
        .run_auth_flow(&InquireLoginPrompt::new())
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    info!(path = %cfg.session_path_or_default().display(), "session saved");
    Ok(())
}

async fn probe(cfg: &AppConfig) -> anyhow::Result<ExitCode> {
    let server = cfg
        .smtp_server
        .clone()
        .ok_or_else(|| anyhow::anyhow!("Set NOTIFY_SMTP_SERVER (env or .env)"))?;
    let port = cfg.smtp_port_or_default();
    let report = TcpProbe::new(cfg.probe_timeout()).probe(&server, port).await;

    match &report.resolved {
        Ok(ips) => {
            let ips: Vec<String> = ips.iter().map(ToString::to_string).collect();
            println!("{}:{} resolves to {}", server, port, ips.join(", "));
        }
        Err(e) => println!("{}:{} DNS resolution failed: {}", server, port, e),
    }
    match &report.tcp {
        Some(Ok(())) => println!("TCP connect: ok"),
        Some(Err(e)) => println!("TCP connect: failed ({})", e),
        None => println!("TCP connect: skipped"),
    }

    Ok(if report.is_reachable() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

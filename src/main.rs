use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use whatsnew::api::{self, AppState};
use whatsnew::config::WhatsNewConfig;
use whatsnew::models::{Role, Version};
use whatsnew::registry::modules_of_interest;
use whatsnew::render::render_notices;

#[derive(Parser)]
#[command(name = "whatsnew")]
#[command(about = "Announce new module features to control-panel users")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// Show notices a user has not yet acknowledged
    Show {
        #[arg(short, long)]
        user: String,
        /// Viewer role: master, reseller or owner
        #[arg(short, long, default_value = "master")]
        role: String,
        /// Domain or server id links should point at
        #[arg(short, long)]
        target: Option<String>,
    },
    /// List unacknowledged (module, version) releases
    Pending {
        #[arg(short, long)]
        user: String,
    },
    /// Mark features as seen
    Ack {
        #[arg(short, long)]
        user: String,
        /// Module to acknowledge; all modules when omitted
        #[arg(short, long, requires = "version")]
        module: Option<String>,
        /// Version to acknowledge the module at
        #[arg(short, long, requires = "module")]
        version: Option<String>,
    },
    /// Show a module's newest features again
    Unack {
        #[arg(short, long)]
        user: String,
        #[arg(short, long)]
        module: String,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "whatsnew=debug,tower_http=debug".into()),
    );

    // Logs go to stderr so command output stays clean on stdout
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn serve(config: &WhatsNewConfig, port: u16) -> anyhow::Result<()> {
    tracing::info!("Starting whatsnew server on port {}", port);

    let app = api::create_router(AppState::from_config(config)?);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("whatsnew server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = WhatsNewConfig::load();
    let modules = modules_of_interest(&config.registry());

    match cli.command {
        Some(Commands::Serve { port }) => serve(&config, port).await?,
        Some(Commands::Show { user, role, target }) => {
            let role = Role::from_str(&role)
                .ok_or_else(|| anyhow::anyhow!("Unknown role: {}", role))?;
            let state = AppState::from_config(&config)?;
            let host = state.host_for(&user, Some(role));
            let notices =
                state
                    .notifier
                    .try_notices(&user, &modules, host.as_ref(), target.as_deref())?;
            if notices.is_empty() {
                println!("Nothing new for {}", user);
            } else {
                print!("{}", render_notices(&notices));
            }
        }
        Some(Commands::Pending { user }) => {
            let notifier = config.notifier()?;
            for release in notifier
                .resolver()
                .pending_notifications(&user, &modules)?
            {
                println!("{} {}", release.module, release.version);
            }
        }
        Some(Commands::Ack {
            user,
            module,
            version,
        }) => {
            let notifier = config.notifier()?;
            let ledger = notifier.resolver().ledger();
            match (module, version) {
                (Some(module), Some(version)) => {
                    let version: Version = version
                        .parse()
                        .with_context(|| format!("Invalid version for {}", module))?;
                    ledger.acknowledge(&user, &module, version)?;
                    println!("Acknowledged {} {} for {}", module, version, user);
                }
                _ => {
                    ledger.acknowledge_all(&user, &modules)?;
                    println!("Acknowledged {} modules for {}", modules.len(), user);
                }
            }
        }
        Some(Commands::Unack { user, module }) => {
            let notifier = config.notifier()?;
            let version = notifier.resolver().ledger().unacknowledge(&user, &module)?;
            println!("{} now acknowledged at {} for {}", module, version, user);
        }
        None => serve(&config, 3000).await?,
    }

    Ok(())
}

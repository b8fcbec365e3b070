use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use keywarden_core::CreateApiKey;
use keywarden_db::Db;
use keywarden_service::{KeyService, LocalService, ModelCatalog, OllamaCatalog};
use tokio::net::TcpListener;

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

#[derive(Parser)]
#[command(name = "keywarden-server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new API key bound to a model
    Keygen {
        /// Human-readable name for the key
        #[arg(long, default_value = "Untitled Key")]
        name: String,
        /// Model the key is authorized for (must exist on the backend)
        #[arg(long)]
        model: String,
    },
    /// List all API keys (redacted, no secrets)
    ListKeys,
    /// Revoke (delete) an API key by ID
    RevokeKey {
        /// The API key ID to revoke
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let db = Db::open_default()?;

    let upstream_url = std::env::var("KEYWARDEN_OLLAMA_URL")
        .unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string());
    let catalog: Arc<dyn ModelCatalog> = Arc::new(OllamaCatalog::new(&upstream_url));

    match cli.command {
        Some(Commands::Keygen { name, model }) => {
            let service = LocalService::new(db, catalog);
            let created = service
                .create_key(&CreateApiKey {
                    name,
                    model_name: model,
                })
                .await?;
            eprintln!("Created API key (id: {})", created.record.id);
            // Print the raw key to stdout so it can be captured
            println!("{}", created.secret_key);
            eprintln!("\nStore this key now; it cannot be shown again.");
        }
        Some(Commands::ListKeys) => {
            let service = LocalService::new(db, catalog);
            let keys = service.list_keys().await?;
            if keys.is_empty() {
                eprintln!("No API keys found.");
            } else {
                println!("{:<38} {:<20} {:<22} {:<12} MODEL", "ID", "NAME", "KEY", "CREATED");
                for key in keys {
                    let created = key.created_at.format("%Y-%m-%d").to_string();
                    println!(
                        "{:<38} {:<20} {:<22} {:<12} {}",
                        key.id,
                        if key.name.is_empty() { "-" } else { &key.name },
                        key.secret_key_display,
                        created,
                        key.project_access,
                    );
                }
            }
        }
        Some(Commands::RevokeKey { id }) => {
            let service = LocalService::new(db, catalog);
            service.delete_key(&id).await?;
            eprintln!("Revoked API key {id}");
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| "keywarden=info,tower_http=info".into()),
                )
                .init();

            let bind = std::env::var("KEYWARDEN_BIND").unwrap_or_else(|_| "0.0.0.0".into());
            let port: u16 = std::env::var("KEYWARDEN_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3711);

            let addr = SocketAddr::new(bind.parse()?, port);
            let listener = TcpListener::bind(addr).await?;
            tracing::info!(%addr, upstream = %upstream_url, "keywarden-server listening");

            keywarden_server::serve(listener, db, catalog, &upstream_url).await?;
        }
    }

    Ok(())
}

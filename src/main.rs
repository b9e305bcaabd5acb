use anyhow::Result;
use rasoibot::cli::{parse_args, Commands};
use rasoibot::client::run_chat;
use rasoibot::config::ServerConfig;
use rasoibot::server::run_server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok(); // Load .env file for API keys

    init_tracing();

    match parse_args().command {
        Commands::Serve { port, recipes } => {
            let mut config = ServerConfig::from_env();
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(recipes) = recipes {
                config.recipes_path = recipes;
            }
            run_server(config).await
        }
        Commands::Chat { api_url } => run_chat(&api_url).await,
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rasoibot=info,tower_http=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

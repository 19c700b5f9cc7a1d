use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Context};
use respond::{ChatClientConfig, OpenAiChatClient};

use advisor_web::{app, env, logging::configure_logging, page::PageRenderer, AdvisorConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // a missing .env file is fine, the variables may come from the environment
    dotenv::dotenv().ok();
    configure_logging()?;
    configure_current_dir()?;

    let app_state = configure_app_state()?;
    let app = app(app_state);

    let addr = socket_addr_from_env(env::API_PORT, 3000);
    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .context("server terminated unexpectedly")
}

fn socket_addr_from_env(port_env_key: &str, default: u16) -> SocketAddr {
    let port = std::env::var(port_env_key).ok();
    let port = port.and_then(|x| x.parse().ok()).unwrap_or(default);
    SocketAddr::from(([0, 0, 0, 0], port))
}

fn configure_app_state() -> anyhow::Result<Arc<AppState>> {
    let client_config = ChatClientConfig::from_env();
    tracing::info!(
        "Using chat completion service at {} (model = {})",
        client_config.base_url,
        client_config.model
    );

    Ok(Arc::new(AppState {
        client: Arc::new(OpenAiChatClient::new(client_config)),
        config: AdvisorConfig::from_env(),
        pages: PageRenderer::new()?,
    }))
}

fn configure_current_dir() -> anyhow::Result<()> {
    let styles_path = std::path::Path::new("./public/styles");
    if !styles_path.exists() {
        let current_exe = std::env::current_exe().context("failed to get cwd")?;
        let mut dir = Some(current_exe);
        while let Some(current) = dir {
            let styles_test_path = current.join("advisor_web/public/styles");
            if styles_test_path.exists() {
                std::env::set_current_dir(current.join("advisor_web"))
                    .context("failed to set current dir to content root")?;

                return Ok(());
            }
            dir = current.parent().map(|x| x.to_path_buf());
        }
        bail!("failed to find public/styles content root");
    }
    Ok(())
}

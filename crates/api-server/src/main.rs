use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use api_server::http::{self, RateLimitPolicy, RateLimiter};
use support_core::chat::{DeskSettings, SupportDesk};
use support_core::config::{ApiConfig, load_dotenv};
use support_core::llm::{CompletionGatewayConfig, OpenAiGateway};
use support_core::logs::LogStore;
use support_core::store_data::StorePolicyData;
use tracing::{error, info};

const RATE_LIMIT_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    if let Err(err) = load_dotenv() {
        eprintln!("{err}");
        std::process::exit(1);
    }

    init_tracing();

    let config = match ApiConfig::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("failed to read config: {err}");
            std::process::exit(1);
        }
    };

    let gateway_config = match CompletionGatewayConfig::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("failed to read completion gateway config: {err}");
            std::process::exit(1);
        }
    };
    let models = gateway_config.model_route.clone();

    let gateway = match OpenAiGateway::new(gateway_config) {
        Ok(gateway) => gateway,
        Err(err) => {
            error!("failed to build completion gateway: {err}");
            std::process::exit(1);
        }
    };

    let desk = SupportDesk::new(
        StorePolicyData::standard(),
        DeskSettings {
            store_name: config.store_name.clone(),
            support_email: config.support_email.clone(),
            models,
        },
    );

    let rate_limiter = RateLimiter::new(RateLimitPolicy {
        max_requests: config.rate_limit.max_requests,
        window: Duration::from_millis(config.rate_limit.window_ms),
    });
    rate_limiter.spawn_pruner(RATE_LIMIT_PRUNE_INTERVAL);

    let app = http::build_router(http::AppState {
        desk: Arc::new(desk),
        gateway: Arc::new(gateway),
        logs: Arc::new(LogStore::open(&config.data_dir)),
        environment: config.environment,
        allowed_origins: config.allowed_origins.clone(),
        rate_limiter,
        trusted_proxy_ips: config.trusted_proxy_ips.iter().copied().collect(),
    });

    let addr: SocketAddr = match config.bind_addr.parse() {
        Ok(addr) => addr,
        Err(err) => {
            error!(bind_addr = %config.bind_addr, "invalid bind address: {err}");
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("failed to bind {addr}: {err}");
            std::process::exit(1);
        }
    };

    info!(
        environment = ?config.environment,
        data_dir = %config.data_dir.display(),
        "api server listening on {}",
        listener.local_addr().unwrap_or(addr)
    );

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal());

    if let Err(err) = server.await {
        error!("server terminated: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "api_server=info,support_core=info,tower_http=info".to_string());
    let json_output = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_output {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

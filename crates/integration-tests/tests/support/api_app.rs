use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use api_server::http::{AppState, RateLimitPolicy, RateLimiter, build_router};
use support_core::chat::{DeskSettings, SupportDesk};
use support_core::config::AppEnvironment;
use support_core::llm::{CompletionGatewayError, ModelRoute};
use support_core::logs::LogStore;
use support_core::store_data::StorePolicyData;
use tempfile::TempDir;

use super::gateway_mock::MockGateway;

pub const SUPPORT_EMAIL: &str = "help@rouqe.test";
pub const GENERAL_MODEL: &str = "general-model";
pub const SIZING_MODEL: &str = "sizing-model";

pub struct TestApp {
    pub router: axum::Router,
    pub gateway: Arc<MockGateway>,
    pub logs: Arc<LogStore>,
    pub data_dir: PathBuf,
    _temp_dir: TempDir,
}

pub struct TestAppOptions {
    pub environment: AppEnvironment,
    pub replies: Vec<Result<String, CompletionGatewayError>>,
    pub max_requests: usize,
    /// Points the log store at a regular file so every write fails.
    pub broken_storage: bool,
}

impl Default for TestAppOptions {
    fn default() -> Self {
        Self {
            environment: AppEnvironment::Development,
            replies: Vec::new(),
            max_requests: 1_000,
            broken_storage: false,
        }
    }
}

pub fn build_test_app(options: TestAppOptions) -> TestApp {
    let temp_dir = TempDir::new().expect("tempdir should be created");
    let data_dir = if options.broken_storage {
        let blocker = temp_dir.path().join("not-a-directory");
        std::fs::write(&blocker, "blocker").expect("blocker file should write");
        blocker
    } else {
        temp_dir.path().to_path_buf()
    };

    let gateway = Arc::new(MockGateway::with_replies(options.replies));
    let logs = Arc::new(LogStore::open(&data_dir));
    let desk = SupportDesk::new(
        StorePolicyData::standard(),
        DeskSettings {
            store_name: "Rouqe Golf".to_string(),
            support_email: SUPPORT_EMAIL.to_string(),
            models: ModelRoute {
                general_model: GENERAL_MODEL.to_string(),
                sizing_model: SIZING_MODEL.to_string(),
            },
        },
    );

    let router = build_router(AppState {
        desk: Arc::new(desk),
        gateway: gateway.clone(),
        logs: Arc::clone(&logs),
        environment: options.environment,
        allowed_origins: vec!["https://shop.rouqe.test".to_string()],
        rate_limiter: RateLimiter::new(RateLimitPolicy {
            max_requests: options.max_requests,
            window: Duration::from_secs(900),
        }),
        trusted_proxy_ips: HashSet::new(),
    });

    TestApp {
        router,
        gateway,
        logs,
        data_dir,
        _temp_dir: temp_dir,
    }
}

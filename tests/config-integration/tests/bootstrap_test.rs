//! 配置初始化流程集成测试
use async_trait::async_trait;
use config_abstractions::{ConfigStore, ConfigTopic, RuntimeConfigFetcher};
use config_common::{ConfigDocument, ConfigError, ConfigResult, ConfigValue, InitPhase};
use config_composition::ConfigContext;
use parking_lot::Mutex;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;

/// 记录请求地址的运行时配置获取器
struct StubFetcher {
    response: Mutex<Option<ConfigResult<serde_json::Value>>>,
    urls: Mutex<Vec<String>>,
}

impl StubFetcher {
    fn returning(body: serde_json::Value) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(Some(Ok(body))),
            urls: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(Some(Err(ConfigError::RuntimeFetchFailed {
                message: "503 Service Unavailable".to_string(),
            }))),
            urls: Mutex::new(Vec::new()),
        })
    }

    fn urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }
}

#[async_trait]
impl RuntimeConfigFetcher for StubFetcher {
    async fn fetch(&self, url: &Url) -> ConfigResult<serde_json::Value> {
        self.urls.lock().push(url.to_string());
        self.response
            .lock()
            .take()
            .unwrap_or_else(|| Ok(json!({})))
    }
}

fn write_site_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn count(context: &ConfigContext, topic: ConfigTopic) -> Arc<AtomicUsize> {
    let hits = Arc::new(AtomicUsize::new(0));
    let h = hits.clone();
    context.store().events().subscribe(topic, move |_| {
        h.fetch_add(1, Ordering::SeqCst);
    });
    hits
}

#[tokio::test]
async fn test_full_pipeline_precedence() {
    std::env::set_var("IT_FULL_APP_ID", "learning");
    std::env::set_var("IT_FULL_LMS_BASE_URL", "http://from-env");

    let dir = tempfile::tempdir().unwrap();
    let site = write_site_file(
        &dir,
        "site.toml",
        r#"
LMS_BASE_URL = "https://lms.example.com"
MFE_CONFIG_API_URL = "https://config.example.com/api/v1/mfe_config"
SITE_NAME = "Site File"

[FEATURES]
search = true
"#,
    );
    let fetcher = StubFetcher::returning(json!({
        "SITE_NAME": "Runtime Site",
        "FEATURES": { "chat": true }
    }));

    let mut context = ConfigContext::builder()
        .add_env_vars("IT_FULL_")
        .add_site_file(&site)
        .with_runtime_fetcher(fetcher.clone())
        .build()
        .unwrap();
    let changes = count(&context, ConfigTopic::ConfigChanged);
    let initialized = count(&context, ConfigTopic::ConfigInitialized);

    let report = context.initialize().await.unwrap();

    let phases: Vec<_> = report.sources.iter().map(|s| s.phase).collect();
    assert_eq!(
        phases,
        vec![InitPhase::Handler, InitPhase::SiteFile, InitPhase::Runtime]
    );
    assert_eq!(changes.load(Ordering::SeqCst), 3);
    assert_eq!(initialized.load(Ordering::SeqCst), 1);

    let config = context.store().get_config();
    assert_eq!(config.get_str("APP_ID").as_deref(), Some("learning"));
    assert_eq!(
        config.get_str("LMS_BASE_URL").as_deref(),
        Some("https://lms.example.com")
    );
    assert_eq!(config.get_str("SITE_NAME").as_deref(), Some("Runtime Site"));
    assert_eq!(config.get_path("FEATURES.search").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(config.get_path("FEATURES.chat").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(config.get_str("PUBLIC_PATH").as_deref(), Some("/"));

    assert_eq!(
        fetcher.urls(),
        vec!["https://config.example.com/api/v1/mfe_config?mfe=learning"]
    );
}

#[tokio::test]
async fn test_runtime_failure_does_not_block_initialization() {
    let fetcher = StubFetcher::failing();
    let mut context = ConfigContext::builder()
        .add_document(
            "handler",
            ConfigDocument::new()
                .with("MFE_CONFIG_API_URL", "https://config.example.com/api")
                .with("SITE_NAME", "Handler Site"),
        )
        .with_runtime_fetcher(fetcher.clone())
        .build()
        .unwrap();
    let errors = count(&context, ConfigTopic::InitError);

    let report = context.initialize().await.unwrap();

    assert!(context.is_initialized());
    assert_eq!(errors.load(Ordering::SeqCst), 0);
    assert_eq!(fetcher.urls(), vec!["https://config.example.com/api"]);
    assert_eq!(
        report.applied_sources().collect::<Vec<_>>(),
        vec!["handler"]
    );
    assert_eq!(
        context.store().get_config().get_str("SITE_NAME").as_deref(),
        Some("Handler Site")
    );
}

#[tokio::test]
async fn test_runtime_skipped_without_api_url() {
    let fetcher = StubFetcher::returning(json!({ "SITE_NAME": "never" }));
    let mut context = ConfigContext::builder()
        .with_runtime_fetcher(fetcher.clone())
        .build()
        .unwrap();

    context.initialize().await.unwrap();

    assert!(fetcher.urls().is_empty());
    assert_eq!(context.store().get_config().get_str("SITE_NAME").as_deref(), Some(""));
}

#[tokio::test]
async fn test_missing_required_site_file_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.yaml");

    let mut context = ConfigContext::builder()
        .add_required_site_file(&missing)
        .build()
        .unwrap();
    let errors = count(&context, ConfigTopic::InitError);
    let initialized = count(&context, ConfigTopic::ConfigInitialized);

    let result = context.initialize().await;

    assert!(matches!(result, Err(ConfigError::FileReadError { .. })));
    assert_eq!(errors.load(Ordering::SeqCst), 1);
    assert_eq!(initialized.load(Ordering::SeqCst), 0);
    assert!(!context.is_initialized());
}

#[tokio::test]
async fn test_yaml_and_json_site_files() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = write_site_file(
        &dir,
        "site.yml",
        "SITE_NAME: YAML Site\nLOGO_URL: https://cdn.example.com/logo.svg\n",
    );
    let json_file = write_site_file(&dir, "override.json", r#"{ "SITE_NAME": "JSON Site" }"#);

    let mut context = ConfigContext::builder()
        .add_site_file(&yaml)
        .add_site_file(&json_file)
        .build()
        .unwrap();
    context.initialize().await.unwrap();

    let config = context.store().get_config();
    assert_eq!(config.get_str("SITE_NAME").as_deref(), Some("JSON Site"));
    assert_eq!(
        config.get_str("LOGO_URL").as_deref(),
        Some("https://cdn.example.com/logo.svg")
    );
}

#[tokio::test]
async fn test_malformed_site_file_reports_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let broken = write_site_file(&dir, "site.json", "{ not json");

    let mut context = ConfigContext::builder()
        .add_site_file(&broken)
        .build()
        .unwrap();

    let result = context.initialize().await;
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    assert!(!context.is_initialized());
}

#[tokio::test]
async fn test_handle_taken_before_initialize_sees_loaded_config() {
    let dir = tempfile::tempdir().unwrap();
    let site = write_site_file(
        &dir,
        "site.json",
        r#"{ "LMS_BASE_URL": "https://lms.example.com" }"#,
    );

    let mut context = ConfigContext::builder()
        .add_site_file(&site)
        .build()
        .unwrap();
    let early = context.store().get_config();
    assert_eq!(early.get("LMS_BASE_URL"), Some(ConfigValue::Null));

    context.initialize().await.unwrap();

    assert_eq!(
        early.get_str("LMS_BASE_URL").as_deref(),
        Some("https://lms.example.com")
    );
    assert!(early.ptr_eq(&context.store().get_config()));
}

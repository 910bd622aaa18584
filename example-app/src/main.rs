//! # 示例应用程序
//!
//! 演示微前端配置的完整流程：默认配置、必需键登记、环境变量、
//! 站点配置文件、运行时配置，以及配置事件订阅。

use anyhow::Context;
use async_trait::async_trait;
use clap::Parser;
use config_abstractions::{ConfigStore, ConfigTopic, RuntimeConfigFetcher};
use config_common::{ConfigError, ConfigResult};
use config_composition::{ConfigContext, LoggingConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "Lorn MFE 配置示例应用")]
struct Args {
    /// 站点配置文件（TOML/JSON/YAML），不存在时跳过
    #[arg(short, long, default_value = "config/site.toml")]
    site_config: PathBuf,

    /// 模拟运行时配置接口返回的 JSON 文件
    #[arg(long)]
    runtime_config: Option<PathBuf>,

    /// 环境变量前缀
    #[arg(long, default_value = "MFE_")]
    env_prefix: String,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 以 JSON 格式输出日志
    #[arg(long)]
    json_logs: bool,
}

/// 从本地文件读取运行时配置，代替真实的 HTTP 请求
struct FileRuntimeFetcher {
    path: PathBuf,
}

#[async_trait]
impl RuntimeConfigFetcher for FileRuntimeFetcher {
    async fn fetch(&self, url: &Url) -> ConfigResult<serde_json::Value> {
        info!("运行时配置请求 {} 由本地文件响应: {}", url, self.path.display());
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ConfigError::RuntimeFetchFailed {
                message: format!("{}: {}", self.path.display(), e),
            })?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let logging = if args.json_logs {
        LoggingConfig::production()
    } else {
        LoggingConfig::default()
    };

    let mut builder = ConfigContext::builder()
        .with_logging(logging.with_filter(args.log_level.as_str()))
        .with_event_logging(true)
        .add_env_vars(args.env_prefix.as_str())
        .add_site_file(&args.site_config);

    if let Some(path) = args.runtime_config.clone() {
        builder = builder.with_runtime_fetcher(Arc::new(FileRuntimeFetcher { path }));
    }

    let mut context = builder.build().context("构建配置上下文失败")?;
    info!("启动 Lorn MFE 示例应用");

    let store = context.store().clone();
    store.ensure_config(&["LMS_BASE_URL", "SITE_NAME"], Some("example-app"));

    store.events().subscribe(ConfigTopic::InitError, |event| {
        warn!("初始化失败: {:?}", event.metadata.get("error"));
    });

    let report = context.initialize().await.context("配置初始化失败")?;
    for source in &report.sources {
        info!(
            "配置源 {} ({}): {}",
            source.name,
            source.phase,
            if source.applied { "已合并" } else { "跳过" }
        );
    }

    let diagnostics = store.diagnostics();
    if !diagnostics.is_empty() {
        warn!("配置诊断 {} 条", diagnostics.len());
    }

    let config = store.get_config();
    println!("{}", serde_json::to_string_pretty(&config.to_json())?);
    Ok(())
}

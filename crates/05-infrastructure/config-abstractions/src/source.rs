//! 配置源抽象接口

use async_trait::async_trait;
use config_common::{ConfigDocument, ConfigResult, InitPhase};
use url::Url;

/// 配置源 trait
///
/// 每个配置源属于一个初始化阶段，加载结果由启动器合并进配置存储。
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// 加载配置
    ///
    /// `current` 是加载前的配置文档；返回 `None` 表示本次跳过。
    async fn load(&self, current: &ConfigDocument) -> ConfigResult<Option<ConfigDocument>>;

    /// 获取配置源名称
    fn name(&self) -> &str;

    /// 所属初始化阶段
    fn phase(&self) -> InitPhase;
}

/// 运行时配置获取器
///
/// HTTP 请求由调用方实现，这里只约定请求地址和响应体。
#[async_trait]
pub trait RuntimeConfigFetcher: Send + Sync {
    /// 请求运行时配置，返回响应体 JSON
    async fn fetch(&self, url: &Url) -> ConfigResult<serde_json::Value>;
}

//! 配置上下文构建器

use crate::context::ConfigContext;
use crate::logging::LoggingConfig;
use config_abstractions::{ConfigSource, LateRegistrationPolicy, RuntimeConfigFetcher};
use config_common::{ConfigDocument, ConfigResult};
use config_impl::{
    default_config, EnvironmentConfigSource, InlineConfigSource, LoggingConfigEventListener,
    MfeConfigStore, RuntimeConfigSource, SiteFileConfigSource, StoreOptions,
};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// 配置上下文构建器
///
/// 收集初始文档、存储选项和各阶段配置源，构建出尚未初始化的 [`ConfigContext`]。
pub struct ConfigContextBuilder {
    initial: ConfigDocument,
    options: StoreOptions,
    sources: Vec<Box<dyn ConfigSource>>,
    event_logging: bool,
    logging: Option<LoggingConfig>,
}

impl std::fmt::Debug for ConfigContextBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigContextBuilder")
            .field("initial_keys", &self.initial.len())
            .field("options", &self.options)
            .field(
                "sources",
                &self.sources.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("event_logging", &self.event_logging)
            .field("logging", &self.logging)
            .finish()
    }
}

impl ConfigContextBuilder {
    /// 以默认配置文档为起点
    pub fn new() -> Self {
        Self {
            initial: default_config(),
            options: StoreOptions::default(),
            sources: Vec::new(),
            event_logging: false,
            logging: None,
        }
    }

    /// 替换初始文档
    pub fn with_initial_document(mut self, document: ConfigDocument) -> Self {
        self.initial = document;
        self
    }

    /// 初始化完成后登记的必需键检查如何处理
    pub fn late_registration(mut self, policy: LateRegistrationPolicy) -> Self {
        self.options.late_registration = policy;
        self
    }

    /// 诊断记录保留条数
    pub fn diagnostics_capacity(mut self, capacity: usize) -> Self {
        self.options.diagnostics_capacity = capacity;
        self
    }

    /// 将所有配置事件写入日志
    pub fn with_event_logging(mut self, enabled: bool) -> Self {
        self.event_logging = enabled;
        self
    }

    /// 构建时安装全局日志订阅者
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging = Some(config);
        self
    }

    /// 添加任意配置源，按其自身的阶段执行
    pub fn add_source<S>(mut self, source: S) -> Self
    where
        S: ConfigSource + 'static,
    {
        info!("添加配置源: {} ({})", source.name(), source.phase());
        self.sources.push(Box::new(source));
        self
    }

    /// 添加初始化处理器，处理函数接收当前配置并返回要合并的部分配置
    pub fn add_handler<F>(self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&ConfigDocument) -> ConfigResult<ConfigDocument> + Send + Sync + 'static,
    {
        self.add_source(InlineConfigSource::from_fn(name, handler))
    }

    /// 添加固定文档作为初始化处理器
    pub fn add_document(self, name: impl Into<String>, document: ConfigDocument) -> Self {
        self.add_source(InlineConfigSource::from_document(name, document))
    }

    /// 添加环境变量配置源，读取默认键
    pub fn add_env_vars(self, prefix: impl Into<String>) -> Self {
        self.add_source(EnvironmentConfigSource::new(prefix))
    }

    /// 添加站点配置文件，文件不存在时跳过
    pub fn add_site_file<P: AsRef<Path>>(self, path: P) -> Self {
        self.add_source(SiteFileConfigSource::new(path))
    }

    /// 添加必须存在的站点配置文件
    pub fn add_required_site_file<P: AsRef<Path>>(self, path: P) -> Self {
        self.add_source(SiteFileConfigSource::new(path).required(true))
    }

    /// 启用运行时配置阶段
    pub fn with_runtime_fetcher(self, fetcher: Arc<dyn RuntimeConfigFetcher>) -> Self {
        self.add_source(RuntimeConfigSource::new(fetcher))
    }

    /// 构建配置上下文
    pub fn build(self) -> ConfigResult<ConfigContext> {
        if let Some(logging) = &self.logging {
            logging.init()?;
        }

        let store = MfeConfigStore::with_options(self.initial, self.options);
        if self.event_logging {
            store
                .events()
                .register_listener(Arc::new(LoggingConfigEventListener::new()));
        }

        info!("配置上下文构建完成, 配置源数量: {}", self.sources.len());
        Ok(ConfigContext::new(store, self.sources))
    }
}

impl Default for ConfigContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

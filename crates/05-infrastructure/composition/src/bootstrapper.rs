//! 配置启动器

use config_abstractions::{ConfigSource, ConfigStore};
use config_common::{ConfigError, ConfigResult, InitPhase};
use config_impl::MfeConfigStore;
use tracing::{debug, error, info};

/// 单个配置源的执行结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub name: String,
    pub phase: InitPhase,
    /// 是否向存储贡献了配置
    pub applied: bool,
}

/// 初始化报告
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    /// 按执行顺序排列
    pub sources: Vec<SourceReport>,
}

impl InitReport {
    /// 实际贡献了配置的配置源名称
    pub fn applied_sources(&self) -> impl Iterator<Item = &str> {
        self.sources
            .iter()
            .filter(|s| s.applied)
            .map(|s| s.name.as_str())
    }
}

/// 配置启动器
///
/// 按 处理器 → 站点文件 → 运行时 的顺序执行配置源，同一阶段内按注册顺序执行。
/// 每个配置源看到的是之前所有阶段合并后的配置；全部完成后发布初始化事件。
pub struct ConfigBootstrapper {
    store: MfeConfigStore,
    sources: Vec<Box<dyn ConfigSource>>,
}

impl std::fmt::Debug for ConfigBootstrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigBootstrapper")
            .field("store", &self.store)
            .field(
                "sources",
                &self.sources.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ConfigBootstrapper {
    /// 初始化事件和失败事件的来源名称
    pub const SOURCE_NAME: &'static str = "ConfigBootstrapper";

    /// 创建启动器，配置源按注册顺序保存
    pub fn new(store: MfeConfigStore, sources: Vec<Box<dyn ConfigSource>>) -> Self {
        Self { store, sources }
    }

    /// 执行初始化
    ///
    /// 任一配置源返回错误时发布初始化失败事件并中止，存储保持未初始化状态。
    pub async fn run(self) -> ConfigResult<InitReport> {
        if self.store.lifecycle_state().is_initialized() {
            error!("配置已经完成初始化, 拒绝再次启动");
            return Err(ConfigError::AlreadyInitialized);
        }

        info!("开始初始化配置, 配置源数量: {}", self.sources.len());
        let mut report = InitReport::default();

        for phase in InitPhase::ORDERED {
            for source in self.sources.iter().filter(|s| s.phase() == phase) {
                let applied = self.apply(source.as_ref()).await?;
                report.sources.push(SourceReport {
                    name: source.name().to_string(),
                    phase,
                    applied,
                });
            }
            debug!("初始化阶段完成: {}", phase);
        }

        self.store.mark_initialized(Self::SOURCE_NAME);
        info!(
            "配置初始化完成, 生效的配置源: {:?}",
            report.applied_sources().collect::<Vec<_>>()
        );
        Ok(report)
    }

    async fn apply(&self, source: &dyn ConfigSource) -> ConfigResult<bool> {
        let current = self.store.get_config().snapshot();
        debug!("加载配置源: {} ({})", source.name(), source.phase());

        match source.load(&current).await {
            Ok(Some(document)) => {
                self.store.merge_config_named(document, Some(source.name()));
                Ok(true)
            }
            Ok(None) => {
                debug!("配置源未提供配置: {}", source.name());
                Ok(false)
            }
            Err(e) => {
                error!("配置源 {} 加载失败: {}", source.name(), e);
                self.store
                    .publish_init_error(Self::SOURCE_NAME, &e.to_string());
                Err(e)
            }
        }
    }
}

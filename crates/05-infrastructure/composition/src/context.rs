//! 配置上下文

use crate::bootstrapper::{ConfigBootstrapper, InitReport};
use crate::builder::ConfigContextBuilder;
use config_abstractions::{ConfigSource, ConfigStore};
use config_common::{ConfigResult, InitPhase};
use config_impl::MfeConfigStore;
use std::sync::Arc;

/// 配置上下文
///
/// 应用持有的配置入口：一个配置存储加上尚未执行的配置源。
/// 初始化之前即可读取默认配置、登记 `ensure_config`、订阅事件。
pub struct ConfigContext {
    store: MfeConfigStore,
    pending: Vec<Box<dyn ConfigSource>>,
}

impl std::fmt::Debug for ConfigContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigContext")
            .field("store", &self.store)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl ConfigContext {
    /// 创建构建器，初始文档为默认配置
    pub fn builder() -> ConfigContextBuilder {
        ConfigContextBuilder::new()
    }

    pub(crate) fn new(store: MfeConfigStore, sources: Vec<Box<dyn ConfigSource>>) -> Self {
        Self {
            store,
            pending: sources,
        }
    }

    /// 配置存储，克隆得到的是同一个存储的句柄
    pub fn store(&self) -> &MfeConfigStore {
        &self.store
    }

    /// 以 trait 对象形式共享存储
    pub fn shared_store(&self) -> Arc<dyn ConfigStore> {
        Arc::new(self.store.clone())
    }

    /// 尚未执行的配置源（名称, 阶段）
    pub fn pending_sources(&self) -> impl Iterator<Item = (&str, InitPhase)> {
        self.pending.iter().map(|s| (s.name(), s.phase()))
    }

    /// 是否已完成初始化
    pub fn is_initialized(&self) -> bool {
        self.store.lifecycle_state().is_initialized()
    }

    /// 执行全部配置源并发布初始化事件
    ///
    /// 配置源在调用时被取出；失败后再次调用不会重新执行它们。
    pub async fn initialize(&mut self) -> ConfigResult<InitReport> {
        let sources = std::mem::take(&mut self.pending);
        ConfigBootstrapper::new(self.store.clone(), sources).run().await
    }
}

//! 配置存储实现

use crate::defaults::default_config;
use crate::diagnostics::{DiagnosticsLog, DEFAULT_DIAGNOSTICS_CAPACITY};
use crate::event_bus::ConfigEventBus;
use crate::validation::{check_defined_values, check_required_keys};
use config_abstractions::events::{ConfigChangeKind, ConfigEvent, ConfigTopic, SubscriptionId};
use config_abstractions::validator::{
    DiagnosticRecord, EnsureOutcome, LateRegistrationPolicy, RequiredKeysRequest,
    DEFAULT_MERGE_DOCUMENT, DEFAULT_SET_DOCUMENT,
};
use config_abstractions::{ConfigHandle, ConfigStore, SharedDocument};
use config_common::{ConfigDocument, ConfigValue, LifecycleState};
use parking_lot::RwLock;
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

/// 配置存储选项
#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
    /// 初始化完成后登记的 `ensure_config` 如何处理
    pub late_registration: LateRegistrationPolicy,
    /// 保留的诊断条数
    pub diagnostics_capacity: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            late_registration: LateRegistrationPolicy::default(),
            diagnostics_capacity: DEFAULT_DIAGNOSTICS_CAPACITY,
        }
    }
}

struct StoreInner {
    document: SharedDocument,
    state: RwLock<LifecycleState>,
    events: ConfigEventBus,
    diagnostics: DiagnosticsLog,
    options: StoreOptions,
}

/// 微前端配置存储
///
/// 持有当前配置文档、事件总线和生命周期状态。克隆得到的是同一个存储的句柄。
///
/// 修改操作在发布事件之前释放所有锁，订阅者可以在回调中重入
/// `merge_config` / `set_config`；重入引起的连锁通知由调用方自行约束。
#[derive(Clone)]
pub struct MfeConfigStore {
    inner: Arc<StoreInner>,
}

impl std::fmt::Debug for MfeConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MfeConfigStore")
            .field("keys", &self.inner.document.read().len())
            .field("state", &*self.inner.state.read())
            .field("events", &self.inner.events)
            .field("diagnostics", &self.inner.diagnostics.len())
            .field("options", &self.inner.options)
            .finish()
    }
}

impl MfeConfigStore {
    /// 使用默认配置文档创建存储
    pub fn new() -> Self {
        Self::with_options(default_config(), StoreOptions::default())
    }

    /// 使用指定初始文档和选项创建存储
    pub fn with_options(initial: ConfigDocument, options: StoreOptions) -> Self {
        debug!("创建配置存储, 初始键数量: {}", initial.len());
        Self {
            inner: Arc::new(StoreInner {
                document: Arc::new(RwLock::new(initial)),
                state: RwLock::new(LifecycleState::Uninitialized),
                events: ConfigEventBus::new(),
                diagnostics: DiagnosticsLog::new(options.diagnostics_capacity),
                options,
            }),
        }
    }

    /// 事件总线
    pub fn events(&self) -> &ConfigEventBus {
        &self.inner.events
    }

    /// 订阅配置变更
    pub fn on_change<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ConfigEvent) + Send + Sync + 'static,
    {
        self.inner.events.subscribe(ConfigTopic::ConfigChanged, callback)
    }

    /// 获取单个已定义的值
    pub fn get_value(&self, key: &str) -> Option<ConfigValue> {
        self.inner.document.read().get(key).cloned()
    }

    /// 诊断记录快照
    pub fn diagnostics(&self) -> Vec<DiagnosticRecord> {
        self.inner.diagnostics.snapshot()
    }

    /// 存储选项
    pub fn options(&self) -> StoreOptions {
        self.inner.options
    }

    /// 标记初始化完成并发布初始化事件
    ///
    /// 只有第一次调用生效，之后的调用返回 `false`。
    pub fn mark_initialized(&self, source: &str) -> bool {
        {
            let mut state = self.inner.state.write();
            if state.is_initialized() {
                warn!("配置已经完成初始化, 忽略重复的初始化信号: {}", source);
                return false;
            }
            *state = LifecycleState::Initialized;
        }

        info!("配置初始化完成: {}", source);
        self.inner.events.publish(&ConfigEvent::initialized(source));
        true
    }

    /// 发布初始化失败事件
    pub fn publish_init_error(&self, source: &str, message: &str) {
        self.inner
            .events
            .publish(&ConfigEvent::init_error(source, message));
    }

    fn run_required_check(inner: &StoreInner, request: &RequiredKeysRequest) -> Vec<String> {
        let document = inner.document.read();
        check_required_keys(request, &document, &inner.diagnostics)
    }

    fn defer_required_check(&self, request: RequiredKeysRequest) {
        let weak: Weak<StoreInner> = Arc::downgrade(&self.inner);
        self.inner
            .events
            .subscribe_once(ConfigTopic::ConfigInitialized, move |_event| {
                if let Some(inner) = weak.upgrade() {
                    Self::run_required_check(&inner, &request);
                }
            });
    }
}

impl Default for MfeConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for MfeConfigStore {
    fn get_config(&self) -> ConfigHandle {
        ConfigHandle::new(self.inner.document.clone())
    }

    fn set_config_named(&self, document: ConfigDocument, name: Option<&str>) {
        let name = name.unwrap_or(DEFAULT_SET_DOCUMENT);
        check_defined_values(&document, name, &self.inner.diagnostics);

        *self.inner.document.write() = document;
        debug!("配置已整体替换: {}", name);

        self.inner
            .events
            .publish(&ConfigEvent::changed(ConfigChangeKind::Replaced, name));
    }

    fn merge_config_named(&self, partial: ConfigDocument, name: Option<&str>) {
        let name = name.unwrap_or(DEFAULT_MERGE_DOCUMENT);
        check_defined_values(&partial, name, &self.inner.diagnostics);

        self.inner.document.write().deep_merge(partial);
        debug!("配置已合并: {}", name);

        self.inner
            .events
            .publish(&ConfigEvent::changed(ConfigChangeKind::Merged, name));
    }

    fn ensure_config(&self, keys: &[&str], requester: Option<&str>) -> EnsureOutcome {
        let request = RequiredKeysRequest::new(keys.iter().copied(), requester);

        {
            let state = self.inner.state.read();
            if !state.is_initialized() {
                debug!("登记必需键检查: {} -> {:?}", request.requester, request.keys);
                self.defer_required_check(request);
                return EnsureOutcome::Deferred;
            }
        }

        match self.inner.options.late_registration {
            LateRegistrationPolicy::CheckImmediately => {
                debug!("配置已初始化, 立即检查必需键: {}", request.requester);
                let missing = Self::run_required_check(&self.inner, &request);
                EnsureOutcome::Checked { missing }
            }
            LateRegistrationPolicy::Ignore => {
                debug!("配置已初始化, 忽略必需键检查: {}", request.requester);
                EnsureOutcome::Ignored
            }
        }
    }

    fn lifecycle_state(&self) -> LifecycleState {
        *self.inner.state.read()
    }
}

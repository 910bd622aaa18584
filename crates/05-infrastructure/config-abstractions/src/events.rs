//! 配置事件定义

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 事件主题
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigTopic {
    /// 每次 `set_config` / `merge_config` 之后发布
    ConfigChanged,
    /// 所有初始化阶段完成后发布，且只发布一次
    ConfigInitialized,
    /// 初始化阶段失败时发布
    InitError,
}

impl ConfigTopic {
    /// 全部主题
    pub const ALL: [ConfigTopic; 3] = [
        Self::ConfigChanged,
        Self::ConfigInitialized,
        Self::InitError,
    ];

    /// 主题字符串
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConfigChanged => "CONFIG.CHANGED",
            Self::ConfigInitialized => "APP.CONFIG_INITIALIZED",
            Self::InitError => "APP.INIT_ERROR",
        }
    }
}

impl fmt::Display for ConfigTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 配置变更方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigChangeKind {
    /// 深度合并
    Merged,
    /// 整体替换
    Replaced,
}

/// 配置事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigEvent {
    /// 事件主题
    pub topic: ConfigTopic,
    /// 变更方式，只有 `ConfigChanged` 事件携带
    pub change: Option<ConfigChangeKind>,
    /// 事件来源（文档名或组件名）
    pub source: String,
    /// 事件时间
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// 额外元数据
    pub metadata: HashMap<String, String>,
}

impl ConfigEvent {
    fn new(
        topic: ConfigTopic,
        change: Option<ConfigChangeKind>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            topic,
            change,
            source: source.into(),
            timestamp: chrono::Utc::now(),
            metadata: HashMap::new(),
        }
    }

    /// 创建配置变更事件
    pub fn changed(change: ConfigChangeKind, source: impl Into<String>) -> Self {
        Self::new(ConfigTopic::ConfigChanged, Some(change), source)
    }

    /// 创建初始化完成事件
    pub fn initialized(source: impl Into<String>) -> Self {
        Self::new(ConfigTopic::ConfigInitialized, None, source)
    }

    /// 创建初始化失败事件
    pub fn init_error(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ConfigTopic::InitError, None, source).with_metadata("error", message)
    }

    /// 添加元数据
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// 订阅标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(uuid::Uuid);

impl SubscriptionId {
    /// 生成新的随机标识
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 配置事件监听器 trait
pub trait ConfigEventListener: Send + Sync {
    /// 处理事件
    fn on_event(&self, event: &ConfigEvent);

    /// 获取监听器名称
    fn name(&self) -> &str;

    /// 感兴趣的主题，为空表示全部
    fn interested_topics(&self) -> Vec<ConfigTopic> {
        Vec::new()
    }
}

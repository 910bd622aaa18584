//! 配置验证抽象接口

use config_common::ConfigDocument;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `ensure_config` 未指定请求方时使用的名称
pub const DEFAULT_REQUESTER: &str = "unspecified application code";

/// `set_config` 未指定文档名时使用的名称
pub const DEFAULT_SET_DOCUMENT: &str = "config";

/// `merge_config` 未指定文档名时使用的名称
pub const DEFAULT_MERGE_DOCUMENT: &str = "ProcessEnvConfigService";

/// 配置验证器 trait
pub trait ConfigValidator: Send + Sync {
    /// 验证配置文档，返回发现的诊断
    fn validate(&self, document: &ConfigDocument) -> Vec<ConfigDiagnostic>;

    /// 获取验证器名称
    fn name(&self) -> &str;
}

/// 必需键检查请求
///
/// 由 `ensure_config` 创建，在初始化完成时消费一次后丢弃。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredKeysRequest {
    /// 必需的键
    pub keys: Vec<String>,
    /// 请求方
    pub requester: String,
}

impl RequiredKeysRequest {
    /// 创建新的检查请求
    pub fn new<I, S>(keys: I, requester: Option<&str>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            requester: requester.unwrap_or(DEFAULT_REQUESTER).to_string(),
        }
    }

    /// 文档中缺失（不存在或为 `Undefined`）的键，保持请求顺序
    pub fn missing_keys(&self, document: &ConfigDocument) -> Vec<String> {
        self.keys
            .iter()
            .filter(|key| !document.contains(key))
            .cloned()
            .collect()
    }
}

impl ConfigValidator for RequiredKeysRequest {
    fn validate(&self, document: &ConfigDocument) -> Vec<ConfigDiagnostic> {
        self.missing_keys(document)
            .into_iter()
            .map(|key| ConfigDiagnostic::MissingRequiredKey {
                key,
                requester: self.requester.clone(),
            })
            .collect()
    }

    fn name(&self) -> &str {
        &self.requester
    }
}

/// 初始化完成后才注册的 `ensure_config` 如何处理
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LateRegistrationPolicy {
    /// 立即检查
    #[default]
    CheckImmediately,
    /// 忽略，检查永远不会执行
    Ignore,
}

/// `ensure_config` 的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// 已登记，等待初始化完成
    Deferred,
    /// 已立即检查，附带缺失的键
    Checked { missing: Vec<String> },
    /// 初始化已完成且策略为忽略
    Ignored,
}

/// 配置诊断
///
/// 配置问题不会中断程序，只记录为诊断。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigDiagnostic {
    /// 文档中存在值为 `Undefined` 的键
    UndefinedValue { document: String, keys: Vec<String> },
    /// 初始化完成时必需键仍然缺失
    MissingRequiredKey { key: String, requester: String },
}

impl ConfigDiagnostic {
    /// 每个键一条的日志消息
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::UndefinedValue { document, keys } => keys
                .iter()
                .map(|key| format!("Module configuration error: {key} is required by {document}."))
                .collect(),
            Self::MissingRequiredKey { key, requester } => {
                vec![format!("App configuration error: {key} is required by {requester}.")]
            }
        }
    }
}

impl fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join(" "))
    }
}

/// 带时间戳的诊断记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    pub diagnostic: ConfigDiagnostic,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}

impl DiagnosticRecord {
    pub fn new(diagnostic: ConfigDiagnostic) -> Self {
        Self {
            diagnostic,
            recorded_at: chrono::Utc::now(),
        }
    }
}

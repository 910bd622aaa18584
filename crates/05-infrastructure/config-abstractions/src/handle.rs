//! 配置文档句柄

use config_common::{ConfigDocument, ConfigValue};
use parking_lot::{RwLock, RwLockReadGuard};
use std::sync::Arc;

/// 共享的可变配置文档
pub type SharedDocument = Arc<RwLock<ConfigDocument>>;

/// 配置文档的实时只读视图
///
/// 句柄引用存储内部的同一份文档，不是副本：之后通过 `set_config` /
/// `merge_config` 做的修改对已经持有的句柄立即可见。
/// 同一个存储返回的句柄彼此 [`ptr_eq`](ConfigHandle::ptr_eq)。
#[derive(Clone)]
pub struct ConfigHandle {
    document: SharedDocument,
}

impl std::fmt::Debug for ConfigHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigHandle")
            .field("keys", &self.document.read().len())
            .finish()
    }
}

impl ConfigHandle {
    /// 包装存储持有的文档
    pub fn new(document: SharedDocument) -> Self {
        Self { document }
    }

    /// 两个句柄是否指向同一份文档
    pub fn ptr_eq(&self, other: &ConfigHandle) -> bool {
        Arc::ptr_eq(&self.document, &other.document)
    }

    /// 读锁访问整个文档
    ///
    /// 持有读锁期间修改配置会阻塞，不要跨越 `set_config` / `merge_config` 持有。
    pub fn read(&self) -> RwLockReadGuard<'_, ConfigDocument> {
        self.document.read()
    }

    /// 当前文档的副本
    pub fn snapshot(&self) -> ConfigDocument {
        self.document.read().clone()
    }

    /// 获取已定义的值
    pub fn get(&self, key: &str) -> Option<ConfigValue> {
        self.document.read().get(key).cloned()
    }

    /// 获取字符串值
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.document.read().get_str(key).map(str::to_string)
    }

    /// 按点分路径获取嵌套值
    pub fn get_path(&self, path: &str) -> Option<ConfigValue> {
        self.document.read().get_path(path).cloned()
    }

    /// 键是否存在且已定义
    pub fn contains(&self, key: &str) -> bool {
        self.document.read().contains(key)
    }

    /// 顶层键数量
    pub fn len(&self) -> usize {
        self.document.read().len()
    }

    /// 文档是否为空
    pub fn is_empty(&self) -> bool {
        self.document.read().is_empty()
    }

    /// 转换为 JSON 对象
    pub fn to_json(&self) -> serde_json::Value {
        self.document.read().to_json()
    }
}

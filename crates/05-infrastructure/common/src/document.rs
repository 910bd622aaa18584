//! 配置文档数据模型
//!
//! [`ConfigDocument`] 是键到 [`ConfigValue`] 的有序映射。
//! [`ConfigValue::Undefined`] 表示"缺失"哨兵值：解析 JSON/TOML/YAML 时不会产生它，
//! 只有按名称读取但未设置的来源（例如环境变量）才会产生。

use crate::errors::{ConfigError, ConfigResult};
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// 配置值
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConfigValue {
    /// 缺失哨兵值
    #[default]
    Undefined,
    /// 显式未设置
    Null,
    /// 布尔值
    Bool(bool),
    /// 整数
    Integer(i64),
    /// 浮点数
    Float(f64),
    /// 字符串
    String(String),
    /// 数组，合并时整体覆盖
    Array(Vec<ConfigValue>),
    /// 嵌套对象，合并时逐键递归
    Object(ConfigDocument),
}

impl ConfigValue {
    /// 是否为缺失哨兵值
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// 是否为显式 null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// 是否为嵌套对象
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// 字符串值
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// 布尔值
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// 整数值，浮点数不做转换
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// 嵌套对象
    pub fn as_object(&self) -> Option<&ConfigDocument> {
        match self {
            Self::Object(doc) => Some(doc),
            _ => None,
        }
    }

    /// 值类型名称，用于日志和错误信息
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// 转换为 JSON 值，`Undefined` 转换为 `null`
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Undefined | Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Integer(i) => serde_json::Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Array(items) => {
                serde_json::Value::Array(items.iter().map(ConfigValue::to_json).collect())
            }
            Self::Object(doc) => doc.to_json(),
        }
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => n.as_f64().map(Self::Float).unwrap_or(Self::Null),
            },
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(ConfigValue::from).collect())
            }
            serde_json::Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(k, v)| (k, ConfigValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for ConfigValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<ConfigDocument> for ConfigValue {
    fn from(value: ConfigDocument) -> Self {
        Self::Object(value)
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Undefined | Self::Null => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => items.serialize(serializer),
            Self::Object(doc) => doc.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ConfigValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(ConfigValue::from)
    }
}

/// 配置文档
///
/// 键按字典序保存。读取时值为 `Undefined` 的键与不存在的键等价。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigDocument {
    entries: BTreeMap<String, ConfigValue>,
}

impl ConfigDocument {
    /// 创建空文档
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 对象创建文档
    pub fn from_json(value: serde_json::Value) -> ConfigResult<Self> {
        match ConfigValue::from(value) {
            ConfigValue::Object(doc) => Ok(doc),
            other => Err(ConfigError::NotAnObject {
                actual: other.type_name().to_string(),
            }),
        }
    }

    /// 获取已定义的值；缺失或 `Undefined` 返回 `None`
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key).filter(|v| !v.is_undefined())
    }

    /// 获取原始值，包括 `Undefined`
    pub fn get_raw(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    /// 获取字符串值
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ConfigValue::as_str)
    }

    /// 按点分路径获取嵌套值，例如 `"FEATURES.enableSearch"`
    pub fn get_path(&self, path: &str) -> Option<&ConfigValue> {
        let mut parts = path.split('.');
        let mut current = self.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// 键是否存在且已定义
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// 插入或覆盖一个值
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ConfigValue>,
    ) -> Option<ConfigValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// 链式插入
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// 全部键，包括值为 `Undefined` 的键
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// 按键的字典序遍历原始条目
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// 条目数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否没有任何条目
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 顶层值为 `Undefined` 的键
    pub fn undefined_keys(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, v)| v.is_undefined())
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// 深度合并
    ///
    /// 两侧都是对象时逐键递归，否则传入值整体覆盖原值（数组不拼接）。
    /// 传入值为 `Undefined` 的键被跳过，原值保持不变。
    pub fn deep_merge(&mut self, incoming: ConfigDocument) {
        for (key, value) in incoming.entries {
            match value {
                ConfigValue::Undefined => continue,
                ConfigValue::Object(nested) => {
                    if let Some(ConfigValue::Object(existing)) = self.entries.get_mut(&key) {
                        existing.deep_merge(nested);
                        continue;
                    }
                    let mut fresh = ConfigDocument::new();
                    fresh.deep_merge(nested);
                    self.entries.insert(key, ConfigValue::Object(fresh));
                }
                other => {
                    self.entries.insert(key, other);
                }
            }
        }
    }

    /// 转换为 JSON 对象，跳过 `Undefined` 键
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.entries
                .iter()
                .filter(|(_, v)| !v.is_undefined())
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl<K, V> FromIterator<(K, V)> for ConfigDocument
where
    K: Into<String>,
    V: Into<ConfigValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl TryFrom<serde_json::Value> for ConfigDocument {
    type Error = ConfigError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        Self::from_json(value)
    }
}

impl Serialize for ConfigDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let defined: Vec<_> = self.iter().filter(|(_, v)| !v.is_undefined()).collect();
        let mut map = serializer.serialize_map(Some(defined.len()))?;
        for (key, value) in defined {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ConfigDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_json(value).map_err(serde::de::Error::custom)
    }
}

//! # Config Common
//!
//! 配置文档的公共数据模型、错误类型和生命周期定义。
//!
//! ## 核心类型
//!
//! - [`ConfigDocument`] - 配置文档（键到值的映射）
//! - [`ConfigValue`] - 配置值，包含缺失哨兵 [`ConfigValue::Undefined`]
//! - [`ConfigError`] - 配置源加载相关的错误
//! - [`LifecycleState`] - 配置生命周期状态
//! - [`InitPhase`] - 初始化阶段

pub mod document;
pub mod errors;
pub mod lifecycle;

pub use document::*;
pub use errors::*;
pub use lifecycle::*;

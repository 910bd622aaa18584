//! # Configuration Implementation
//!
//! 配置存储的具体实现，提供配置存储、事件总线、验证和各种配置源。
//!
//! ## 主要组件
//!
//! - [`MfeConfigStore`] - 配置存储（`get/set/merge/ensure`）
//! - [`ConfigEventBus`] - 同步事件总线
//! - [`DiagnosticsLog`] - 配置诊断记录
//! - [`InlineConfigSource`] - 初始化处理器配置源
//! - [`EnvironmentConfigSource`] - 环境变量配置源
//! - [`SiteFileConfigSource`] - 站点配置文件配置源（TOML/JSON/YAML）
//! - [`RuntimeConfigSource`] - 运行时配置源

pub mod defaults;
pub mod diagnostics;
pub mod event_bus;
pub mod sources;
pub mod store;
pub mod validation;

pub use defaults::{default_config, default_keys};
pub use diagnostics::*;
pub use event_bus::*;
pub use sources::*;
pub use store::*;

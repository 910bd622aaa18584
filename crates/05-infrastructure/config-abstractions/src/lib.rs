//! # Configuration Abstractions
//!
//! 配置存储抽象层，定义配置存储、配置源、事件和验证的核心接口。
//!
//! ## 核心接口
//!
//! - [`ConfigStore`] - 配置存储接口（`get/set/merge/ensure`）
//! - [`ConfigHandle`] - 配置文档的实时视图
//! - [`ConfigSource`] - 初始化阶段的配置源接口
//! - [`RuntimeConfigFetcher`] - 运行时配置获取接口
//! - [`ConfigEventListener`] - 配置事件监听接口
//! - [`ConfigValidator`] - 配置验证接口

pub mod events;
pub mod handle;
pub mod source;
pub mod store;
pub mod validator;

pub use events::*;
pub use handle::*;
pub use source::*;
pub use store::*;
pub use validator::*;

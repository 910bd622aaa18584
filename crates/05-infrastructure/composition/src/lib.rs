//! # Configuration Composition
//!
//! 配置组合层：把配置存储和各阶段配置源组装在一起，并负责初始化流程。
//!
//! ```no_run
//! use config_composition::ConfigContext;
//! use config_abstractions::ConfigStore;
//!
//! # async fn run() -> config_common::ConfigResult<()> {
//! let mut context = ConfigContext::builder()
//!     .add_env_vars("MFE_")
//!     .add_site_file("site.toml")
//!     .build()?;
//!
//! context.store().ensure_config(&["LMS_BASE_URL"], Some("header"));
//! context.initialize().await?;
//! # Ok(())
//! # }
//! ```

pub mod bootstrapper;
pub mod builder;
pub mod context;
pub mod logging;

pub use bootstrapper::{ConfigBootstrapper, InitReport, SourceReport};
pub use builder::ConfigContextBuilder;
pub use context::ConfigContext;
pub use logging::LoggingConfig;

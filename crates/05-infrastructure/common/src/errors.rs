//! 错误类型定义

use thiserror::Error;

/// 配置错误类型
///
/// 只用于配置源加载、解析等基础设施操作；配置存储本身的
/// `get/set/merge/ensure` 从不返回错误，问题以诊断的形式暴露。
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败: {path}: {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("配置解析失败: {location}: {source}")]
    ParseError {
        location: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("不支持的配置文件格式: {path}")]
    UnsupportedFormat { path: String },

    #[error("配置序列化失败: {source}")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },

    #[error("配置文档必须是对象类型, 实际为: {actual}")]
    NotAnObject { actual: String },

    #[error("配置源 {source_name} 加载失败: {message}")]
    SourceFailed {
        source_name: String,
        message: String,
    },

    #[error("运行时配置请求地址无效: {url}: {message}")]
    InvalidRuntimeUrl { url: String, message: String },

    #[error("运行时配置获取失败: {message}")]
    RuntimeFetchFailed { message: String },

    #[error("配置已经完成初始化")]
    AlreadyInitialized,

    #[error("日志初始化失败: {message}")]
    LoggingInitFailed { message: String },
}

impl ConfigError {
    /// 创建配置源失败错误
    pub fn source_failed(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceFailed {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// 创建解析错误
    pub fn parse_error(
        location: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ParseError {
            location: location.into(),
            source: Box::new(source),
        }
    }
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;

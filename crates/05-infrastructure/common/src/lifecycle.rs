//! 配置生命周期

use std::fmt;

/// 配置生命周期状态
///
/// 每个配置存储只会经历一次 `Uninitialized -> Initialized` 转换，之后不再回退。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    /// 初始化阶段，配置源仍在加载
    #[default]
    Uninitialized,
    /// 所有初始化阶段的配置源已经合并完成
    Initialized,
}

impl LifecycleState {
    /// 是否已经完成初始化
    pub fn is_initialized(self) -> bool {
        matches!(self, Self::Initialized)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => f.write_str("uninitialized"),
            Self::Initialized => f.write_str("initialized"),
        }
    }
}

/// 初始化阶段
///
/// 按声明顺序执行，后面的阶段覆盖前面的阶段。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InitPhase {
    /// 初始化处理器提供的配置
    Handler,
    /// 站点配置文件
    SiteFile,
    /// 运行时配置接口
    Runtime,
}

impl InitPhase {
    /// 全部阶段，按执行顺序
    pub const ORDERED: [InitPhase; 3] = [Self::Handler, Self::SiteFile, Self::Runtime];

    /// 日志中使用的阶段名称
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Handler => "handler",
            Self::SiteFile => "site-file",
            Self::Runtime => "runtime",
        }
    }
}

impl fmt::Display for InitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

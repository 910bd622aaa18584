//! 配置存储抽象接口

use crate::handle::ConfigHandle;
use crate::validator::EnsureOutcome;
use config_common::{ConfigDocument, LifecycleState};

/// 配置存储 trait
///
/// 应用模块通过注入的存储实例读取配置，只有 `set_config` / `merge_config`
/// 可以修改配置。所有操作都是同步的。
pub trait ConfigStore: Send + Sync {
    /// 获取配置文档的实时视图
    ///
    /// 返回的不是副本：之后的 `set_config` / `merge_config` 对句柄可见，
    /// 任意两次调用得到的句柄 [`ConfigHandle::ptr_eq`] 成立。
    fn get_config(&self) -> ConfigHandle;

    /// 整体替换配置，并发布一次配置变更事件
    fn set_config(&self, document: ConfigDocument) {
        self.set_config_named(document, None);
    }

    /// 整体替换配置，`name` 用于诊断信息
    fn set_config_named(&self, document: ConfigDocument, name: Option<&str>);

    /// 深度合并配置，并发布一次配置变更事件
    fn merge_config(&self, partial: ConfigDocument) {
        self.merge_config_named(partial, None);
    }

    /// 深度合并配置，`name` 用于诊断信息
    fn merge_config_named(&self, partial: ConfigDocument, name: Option<&str>);

    /// 登记必需键检查
    ///
    /// `requester` 为空时使用 [`crate::DEFAULT_REQUESTER`]。
    fn ensure_config(&self, keys: &[&str], requester: Option<&str>) -> EnsureOutcome;

    /// 当前生命周期状态
    fn lifecycle_state(&self) -> LifecycleState;
}

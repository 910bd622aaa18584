//! 配置验证实现
//!
//! 两类检查都只产生诊断，不会中断调用方：
//! - 写入配置时检查值为 `Undefined` 的键
//! - 初始化完成时检查 `ensure_config` 登记的必需键

use crate::diagnostics::DiagnosticsLog;
use config_abstractions::validator::{ConfigDiagnostic, ConfigValidator, RequiredKeysRequest};
use config_common::ConfigDocument;
use tracing::debug;

/// 检查文档中值为 `Undefined` 的顶层键，返回这些键
pub fn check_defined_values(
    document: &ConfigDocument,
    document_name: &str,
    diagnostics: &DiagnosticsLog,
) -> Vec<String> {
    let keys = document.undefined_keys();
    if !keys.is_empty() {
        diagnostics.record(ConfigDiagnostic::UndefinedValue {
            document: document_name.to_string(),
            keys: keys.clone(),
        });
    }
    keys
}

/// 执行必需键检查，返回缺失的键
pub fn check_required_keys(
    request: &RequiredKeysRequest,
    document: &ConfigDocument,
    diagnostics: &DiagnosticsLog,
) -> Vec<String> {
    let found = request.validate(document);
    debug!(
        "必需键检查: {} 请求 {} 个键, 缺失 {} 个",
        request.requester,
        request.keys.len(),
        found.len()
    );

    let mut missing = Vec::with_capacity(found.len());
    for diagnostic in found {
        if let ConfigDiagnostic::MissingRequiredKey { key, .. } = &diagnostic {
            missing.push(key.clone());
        }
        diagnostics.record(diagnostic);
    }
    missing
}

//! 默认配置文档

use config_common::{ConfigDocument, ConfigValue};

/// 运行时配置接口地址
pub const MFE_CONFIG_API_URL: &str = "MFE_CONFIG_API_URL";

/// 应用标识，作为运行时配置请求的 `mfe` 参数
pub const APP_ID: &str = "APP_ID";

/// 有固定默认值的键
pub const FIXED_DEFAULTS: [(&str, &str); 7] = [
    ("ACCESS_TOKEN_COOKIE_NAME", "edx-jwt-cookie-header-payload"),
    ("USER_INFO_COOKIE_NAME", "edx-user-info"),
    ("LANGUAGE_PREFERENCE_COOKIE_NAME", "openedx-language-preference"),
    ("PUBLIC_PATH", "/"),
    ("CSRF_TOKEN_API_PATH", "/csrf/api/v1/token"),
    ("ENVIRONMENT", "production"),
    ("SITE_NAME", ""),
];

/// 默认为 null 的键
pub const NULL_DEFAULT_KEYS: [&str; 24] = [
    "BASE_URL",
    "ACCOUNT_PROFILE_URL",
    "ACCOUNT_SETTINGS_URL",
    "CREDENTIALS_BASE_URL",
    "DISCOVERY_API_BASE_URL",
    "PUBLISHER_BASE_URL",
    "ECOMMERCE_BASE_URL",
    "IGNORED_ERROR_REGEX",
    "LEARNING_BASE_URL",
    "LMS_BASE_URL",
    "LOGIN_URL",
    "LOGOUT_URL",
    "STUDIO_BASE_URL",
    "MARKETING_SITE_BASE_URL",
    "ORDER_HISTORY_URL",
    "REFRESH_ACCESS_TOKEN_ENDPOINT",
    "SEGMENT_KEY",
    "LOGO_URL",
    "LOGO_TRADEMARK_URL",
    "LOGO_WHITE_URL",
    "FAVICON_URL",
    MFE_CONFIG_API_URL,
    APP_ID,
    "SUPPORT_URL",
];

/// 全部默认键
pub fn default_keys() -> impl Iterator<Item = &'static str> {
    FIXED_DEFAULTS
        .iter()
        .map(|(key, _)| *key)
        .chain(NULL_DEFAULT_KEYS.iter().copied())
}

/// 进程启动时的默认配置文档
pub fn default_config() -> ConfigDocument {
    FIXED_DEFAULTS
        .iter()
        .map(|(key, value)| (*key, ConfigValue::from(*value)))
        .chain(NULL_DEFAULT_KEYS.iter().map(|key| (*key, ConfigValue::Null)))
        .collect()
}

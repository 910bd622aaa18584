//! 配置源实现

use crate::defaults::{default_keys, APP_ID, MFE_CONFIG_API_URL};
use async_trait::async_trait;
use config_abstractions::{ConfigSource, RuntimeConfigFetcher};
use config_common::{ConfigDocument, ConfigError, ConfigResult, ConfigValue, InitPhase};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};
use url::Url;

type HandlerFn = dyn Fn(&ConfigDocument) -> ConfigResult<ConfigDocument> + Send + Sync;

/// 内联配置源
///
/// 初始化处理器阶段的配置：固定文档或同步处理函数。
/// 需要异步加载的处理器直接实现 [`ConfigSource`]。
pub struct InlineConfigSource {
    name: String,
    handler: Arc<HandlerFn>,
    phase: InitPhase,
}

impl std::fmt::Debug for InlineConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InlineConfigSource")
            .field("name", &self.name)
            .field("phase", &self.phase)
            .finish()
    }
}

impl InlineConfigSource {
    /// 使用固定文档创建
    pub fn from_document(name: impl Into<String>, document: ConfigDocument) -> Self {
        Self::from_fn(name, move |_| Ok(document.clone()))
    }

    /// 使用处理函数创建，函数接收加载前的配置文档
    pub fn from_fn<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&ConfigDocument) -> ConfigResult<ConfigDocument> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            handler: Arc::new(handler),
            phase: InitPhase::Handler,
        }
    }

    /// 设置所属阶段
    pub fn in_phase(mut self, phase: InitPhase) -> Self {
        self.phase = phase;
        self
    }
}

#[async_trait]
impl ConfigSource for InlineConfigSource {
    async fn load(&self, current: &ConfigDocument) -> ConfigResult<Option<ConfigDocument>> {
        (self.handler)(current).map(Some)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn phase(&self) -> InitPhase {
        self.phase
    }
}

/// 环境变量配置源
///
/// 按键名读取 `<prefix><KEY>` 环境变量。未设置的变量默认跳过；
/// 严格模式下以 `Undefined` 返回，由合并时的诊断报告出来。
#[derive(Debug)]
pub struct EnvironmentConfigSource {
    prefix: String,
    keys: Vec<String>,
    strict: bool,
    typed_values: bool,
}

impl EnvironmentConfigSource {
    /// 创建读取全部默认键的环境变量配置源
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            keys: default_keys().map(str::to_string).collect(),
            strict: false,
            typed_values: false,
        }
    }

    /// 设置读取的键
    pub fn with_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// 未设置的变量以 `Undefined` 返回
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// 将 `true`/`false` 和整数解析为对应类型
    pub fn typed_values(mut self, typed: bool) -> Self {
        self.typed_values = typed;
        self
    }

    /// 将配置键转换为环境变量名
    pub fn env_var_name(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    fn parse_value(&self, raw: String) -> ConfigValue {
        if !self.typed_values {
            return ConfigValue::String(raw);
        }
        if let Ok(b) = raw.parse::<bool>() {
            ConfigValue::Bool(b)
        } else if let Ok(i) = raw.parse::<i64>() {
            ConfigValue::Integer(i)
        } else {
            ConfigValue::String(raw)
        }
    }

    /// 从给定的变量查找函数构建文档
    pub fn collect_with<F>(&self, lookup: F) -> ConfigDocument
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut document = ConfigDocument::new();
        for key in &self.keys {
            match lookup(&self.env_var_name(key)) {
                Some(raw) => {
                    document.insert(key.clone(), self.parse_value(raw));
                }
                None if self.strict => {
                    document.insert(key.clone(), ConfigValue::Undefined);
                }
                None => {}
            }
        }
        document
    }
}

#[async_trait]
impl ConfigSource for EnvironmentConfigSource {
    async fn load(&self, _current: &ConfigDocument) -> ConfigResult<Option<ConfigDocument>> {
        debug!("加载环境变量，前缀: {}", self.prefix);

        let document = self.collect_with(|name| std::env::var(name).ok());

        debug!("加载了 {} 个环境变量", document.len());
        Ok(Some(document))
    }

    fn name(&self) -> &str {
        "EnvironmentConfigSource"
    }

    fn phase(&self) -> InitPhase {
        InitPhase::Handler
    }
}

/// 站点配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteFileFormat {
    Toml,
    Json,
    Yaml,
}

impl SiteFileFormat {
    /// 根据扩展名判断格式
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// 站点配置文件配置源
#[derive(Debug)]
pub struct SiteFileConfigSource {
    file_path: PathBuf,
    required: bool,
}

impl SiteFileConfigSource {
    /// 创建新的站点配置文件配置源，文件默认可选
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            file_path: path.as_ref().to_path_buf(),
            required: false,
        }
    }

    /// 文件不存在时报错
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// 配置文件路径
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// 解析配置文件内容
    pub fn parse(&self, content: &str) -> ConfigResult<ConfigDocument> {
        let location = self.file_path.display().to_string();
        let format = SiteFileFormat::from_path(&self.file_path).ok_or_else(|| {
            ConfigError::UnsupportedFormat {
                path: location.clone(),
            }
        })?;

        match format {
            SiteFileFormat::Toml => {
                let table: toml::Table = content
                    .parse()
                    .map_err(|e| ConfigError::parse_error(location.as_str(), e))?;
                Ok(toml_table_to_document(&table))
            }
            SiteFileFormat::Json => {
                let value: serde_json::Value = serde_json::from_str(content)
                    .map_err(|e| ConfigError::parse_error(location.as_str(), e))?;
                ConfigDocument::from_json(value)
            }
            SiteFileFormat::Yaml => {
                let value: serde_json::Value = serde_yaml::from_str(content)
                    .map_err(|e| ConfigError::parse_error(location.as_str(), e))?;
                ConfigDocument::from_json(value)
            }
        }
    }
}

#[async_trait]
impl ConfigSource for SiteFileConfigSource {
    async fn load(&self, _current: &ConfigDocument) -> ConfigResult<Option<ConfigDocument>> {
        debug!("加载站点配置文件: {}", self.file_path.display());

        let exists = tokio::fs::try_exists(&self.file_path)
            .await
            .map_err(|e| ConfigError::FileReadError {
                path: self.file_path.display().to_string(),
                source: e,
            })?;
        if !exists {
            if self.required {
                return Err(ConfigError::FileReadError {
                    path: self.file_path.display().to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "文件不存在"),
                });
            }
            debug!("站点配置文件不存在，跳过: {}", self.file_path.display());
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&self.file_path)
            .await
            .map_err(|e| ConfigError::FileReadError {
                path: self.file_path.display().to_string(),
                source: e,
            })?;

        let document = self.parse(&content)?;
        debug!("站点配置文件加载完成, 键数量: {}", document.len());
        Ok(Some(document))
    }

    fn name(&self) -> &str {
        "SiteFileConfigSource"
    }

    fn phase(&self) -> InitPhase {
        InitPhase::SiteFile
    }
}

/// 将 TOML 表转换为配置文档
fn toml_table_to_document(table: &toml::Table) -> ConfigDocument {
    table
        .iter()
        .map(|(k, v)| (k.clone(), toml_to_value(v)))
        .collect()
}

fn toml_to_value(value: &toml::Value) -> ConfigValue {
    match value {
        toml::Value::String(s) => ConfigValue::String(s.clone()),
        toml::Value::Integer(i) => ConfigValue::Integer(*i),
        toml::Value::Float(f) => ConfigValue::Float(*f),
        toml::Value::Boolean(b) => ConfigValue::Bool(*b),
        toml::Value::Array(arr) => ConfigValue::Array(arr.iter().map(toml_to_value).collect()),
        toml::Value::Table(table) => ConfigValue::Object(toml_table_to_document(table)),
        toml::Value::Datetime(dt) => ConfigValue::String(dt.to_string()),
    }
}

/// 构建运行时配置请求地址：`<MFE_CONFIG_API_URL>?mfe=<APP_ID>`
///
/// 已有的查询参数保留；`APP_ID` 缺失或为空时不追加 `mfe` 参数。
pub fn runtime_config_url(base: &str, app_id: Option<&str>) -> ConfigResult<Url> {
    let mut url = Url::parse(base).map_err(|e| ConfigError::InvalidRuntimeUrl {
        url: base.to_string(),
        message: e.to_string(),
    })?;

    if let Some(app_id) = app_id.filter(|id| !id.is_empty()) {
        url.query_pairs_mut().append_pair("mfe", app_id);
    }
    Ok(url)
}

/// 运行时配置源
///
/// 只在当前配置的 `MFE_CONFIG_API_URL` 非空时生效。请求或解析失败只记录错误，
/// 本阶段不贡献任何配置，初始化继续进行。
pub struct RuntimeConfigSource {
    fetcher: Arc<dyn RuntimeConfigFetcher>,
}

impl std::fmt::Debug for RuntimeConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeConfigSource").finish_non_exhaustive()
    }
}

impl RuntimeConfigSource {
    pub fn new(fetcher: Arc<dyn RuntimeConfigFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl ConfigSource for RuntimeConfigSource {
    async fn load(&self, current: &ConfigDocument) -> ConfigResult<Option<ConfigDocument>> {
        let Some(base) = current.get_str(MFE_CONFIG_API_URL).filter(|s| !s.is_empty()) else {
            debug!("未配置 {}, 跳过运行时配置", MFE_CONFIG_API_URL);
            return Ok(None);
        };

        let url = match runtime_config_url(base, current.get_str(APP_ID)) {
            Ok(url) => url,
            Err(e) => {
                error!("Error with config API: {}", e);
                return Ok(None);
            }
        };

        info!("请求运行时配置: {}", url);
        let body = match self.fetcher.fetch(&url).await {
            Ok(body) => body,
            Err(e) => {
                error!("Error with config API: {}", e);
                return Ok(None);
            }
        };

        match ConfigDocument::from_json(body) {
            Ok(document) => Ok(Some(document)),
            Err(e) => {
                error!("Error with config API: {}", e);
                Ok(None)
            }
        }
    }

    fn name(&self) -> &str {
        "RuntimeConfigSource"
    }

    fn phase(&self) -> InitPhase {
        InitPhase::Runtime
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::collections::HashMap;
    use std::io::Write;

    struct RecordingFetcher {
        response: ConfigResult<serde_json::Value>,
        seen: Mutex<Vec<String>>,
    }

    impl RecordingFetcher {
        fn ok(body: serde_json::Value) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(body),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                response: Err(ConfigError::RuntimeFetchFailed {
                    message: "503".to_string(),
                }),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl RuntimeConfigFetcher for RecordingFetcher {
        async fn fetch(&self, url: &Url) -> ConfigResult<serde_json::Value> {
            self.seen.lock().push(url.to_string());
            match &self.response {
                Ok(body) => Ok(body.clone()),
                Err(e) => Err(ConfigError::RuntimeFetchFailed {
                    message: e.to_string(),
                }),
            }
        }
    }

    fn site_file(extension: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(&format!(".{extension}"))
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_inline_source_sees_current_document() {
        let source = InlineConfigSource::from_fn("handler", |current| {
            let site = current.get_str("SITE_NAME").unwrap_or("none").to_string();
            Ok(ConfigDocument::new().with("ECHO", site))
        });
        let current = ConfigDocument::new().with("SITE_NAME", "Demo");

        let loaded = source.load(&current).await.unwrap().unwrap();
        assert_eq!(loaded.get_str("ECHO"), Some("Demo"));
        assert_eq!(source.phase(), InitPhase::Handler);
    }

    #[test]
    fn test_environment_source_skips_unset_by_default() {
        let env: HashMap<&str, &str> = [("MFE_LMS_BASE_URL", "http://lms")].into_iter().collect();
        let source = EnvironmentConfigSource::new("MFE_").with_keys(["LMS_BASE_URL", "SITE_NAME"]);

        let doc = source.collect_with(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.get_str("LMS_BASE_URL"), Some("http://lms"));
    }

    #[test]
    fn test_environment_source_strict_marks_undefined() {
        let source = EnvironmentConfigSource::new("")
            .with_keys(["SITE_NAME"])
            .strict(true);

        let doc = source.collect_with(|_| None);
        assert_eq!(doc.undefined_keys(), vec!["SITE_NAME"]);
    }

    #[test]
    fn test_environment_source_typed_values() {
        let env: HashMap<&str, &str> =
            [("FLAG", "true"), ("COUNT", "42"), ("NAME", "edX")].into_iter().collect();
        let source = EnvironmentConfigSource::new("")
            .with_keys(["FLAG", "COUNT", "NAME"])
            .typed_values(true);

        let doc = source.collect_with(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(doc.get("FLAG"), Some(&ConfigValue::Bool(true)));
        assert_eq!(doc.get("COUNT"), Some(&ConfigValue::Integer(42)));
        assert_eq!(doc.get_str("NAME"), Some("edX"));
    }

    #[tokio::test]
    async fn test_site_file_toml() {
        let file = site_file(
            "toml",
            "SITE_NAME = \"Demo\"\n[FEATURES]\nsearch = true\nlimit = 5\n",
        );
        let source = SiteFileConfigSource::new(file.path());

        let doc = source.load(&ConfigDocument::new()).await.unwrap().unwrap();
        assert_eq!(doc.get_str("SITE_NAME"), Some("Demo"));
        assert_eq!(doc.get_path("FEATURES.search"), Some(&ConfigValue::Bool(true)));
        assert_eq!(doc.get_path("FEATURES.limit"), Some(&ConfigValue::Integer(5)));
    }

    #[tokio::test]
    async fn test_site_file_json_and_yaml() {
        let json_file = site_file("json", r#"{"LOGO_URL": "/logo.svg"}"#);
        let yaml_file = site_file("yml", "LOGO_URL: /logo.png\nSUPPORT_URL: null\n");

        let json_doc = SiteFileConfigSource::new(json_file.path())
            .load(&ConfigDocument::new())
            .await
            .unwrap()
            .unwrap();
        let yaml_doc = SiteFileConfigSource::new(yaml_file.path())
            .load(&ConfigDocument::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(json_doc.get_str("LOGO_URL"), Some("/logo.svg"));
        assert_eq!(yaml_doc.get_str("LOGO_URL"), Some("/logo.png"));
        assert_eq!(yaml_doc.get("SUPPORT_URL"), Some(&ConfigValue::Null));
    }

    #[tokio::test]
    async fn test_site_file_missing_optional_and_required() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("env.config.json");

        let optional = SiteFileConfigSource::new(&path);
        assert!(optional.load(&ConfigDocument::new()).await.unwrap().is_none());

        let required = SiteFileConfigSource::new(&path).required(true);
        let err = required.load(&ConfigDocument::new()).await.unwrap_err();
        assert!(matches!(err, ConfigError::FileReadError { .. }));
    }

    #[tokio::test]
    async fn test_site_file_stat_error_is_not_treated_as_missing() {
        let parent = site_file("json", "{}");
        let path = parent.path().join("site.toml");

        let err = SiteFileConfigSource::new(&path)
            .load(&ConfigDocument::new())
            .await
            .unwrap_err();
        match err {
            ConfigError::FileReadError { source, .. } => {
                assert_ne!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_site_file_parse_error_and_unsupported_format() {
        let broken = site_file("json", "{ not json");
        let err = SiteFileConfigSource::new(broken.path())
            .load(&ConfigDocument::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));

        let ini = site_file("ini", "a=b");
        let err = SiteFileConfigSource::new(ini.path())
            .load(&ConfigDocument::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_runtime_url_appends_mfe_param() {
        let url = runtime_config_url("https://lms.example.com/api/mfe_config/v1", Some("learning"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://lms.example.com/api/mfe_config/v1?mfe=learning"
        );

        let url = runtime_config_url("https://lms.example.com/cfg?v=2", Some("a b")).unwrap();
        assert_eq!(url.as_str(), "https://lms.example.com/cfg?v=2&mfe=a+b");

        let url = runtime_config_url("https://lms.example.com/cfg", None).unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_runtime_url_rejects_relative() {
        let err = runtime_config_url("/api/mfe_config/v1", Some("x")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRuntimeUrl { .. }));
    }

    #[tokio::test]
    async fn test_runtime_source_skipped_without_api_url() {
        let fetcher = RecordingFetcher::ok(json!({"A": 1}));
        let source = RuntimeConfigSource::new(fetcher.clone());

        let current = ConfigDocument::new().with(MFE_CONFIG_API_URL, ConfigValue::Null);
        assert!(source.load(&current).await.unwrap().is_none());

        let current = ConfigDocument::new().with(MFE_CONFIG_API_URL, "");
        assert!(source.load(&current).await.unwrap().is_none());
        assert!(fetcher.seen.lock().is_empty());
    }

    #[tokio::test]
    async fn test_runtime_source_fetches_and_parses() {
        let fetcher = RecordingFetcher::ok(json!({"SITE_NAME": "Runtime"}));
        let source = RuntimeConfigSource::new(fetcher.clone());
        let current = ConfigDocument::new()
            .with(MFE_CONFIG_API_URL, "http://localhost:18000/api/mfe_config/v1")
            .with(APP_ID, "profile");

        let doc = source.load(&current).await.unwrap().unwrap();
        assert_eq!(doc.get_str("SITE_NAME"), Some("Runtime"));
        assert_eq!(
            *fetcher.seen.lock(),
            vec!["http://localhost:18000/api/mfe_config/v1?mfe=profile"]
        );
    }

    #[tokio::test]
    async fn test_runtime_source_swallows_failures() {
        let current = ConfigDocument::new().with(MFE_CONFIG_API_URL, "http://localhost/cfg");

        let failing = RuntimeConfigSource::new(RecordingFetcher::failing());
        assert!(failing.load(&current).await.unwrap().is_none());

        let not_object = RuntimeConfigSource::new(RecordingFetcher::ok(json!(["x"])));
        assert!(not_object.load(&current).await.unwrap().is_none());
    }
}

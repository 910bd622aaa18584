//! 必需键检查和诊断集成测试
use config_abstractions::{
    ConfigDiagnostic, ConfigStore, ConfigTopic, EnsureOutcome, LateRegistrationPolicy,
};
use config_common::{ConfigDocument, ConfigValue};
use config_composition::ConfigContext;
use parking_lot::Mutex;
use std::sync::Arc;

fn messages(context: &ConfigContext) -> Vec<String> {
    context
        .store()
        .diagnostics()
        .into_iter()
        .flat_map(|r| r.diagnostic.messages())
        .collect()
}

#[tokio::test]
async fn test_ensure_before_init_checks_final_config() {
    let mut context = ConfigContext::builder()
        .add_document(
            "handler",
            ConfigDocument::new().with("LMS_BASE_URL", "https://lms.example.com"),
        )
        .build()
        .unwrap();

    let outcome = context
        .store()
        .ensure_config(&["LMS_BASE_URL", "CUSTOM_KEY"], Some("footer"));
    assert_eq!(outcome, EnsureOutcome::Deferred);
    assert!(context.store().diagnostics().is_empty());

    context.initialize().await.unwrap();

    assert_eq!(
        messages(&context),
        vec!["App configuration error: CUSTOM_KEY is required by footer."]
    );
}

#[tokio::test]
async fn test_null_default_counts_as_present() {
    let mut context = ConfigContext::builder().build().unwrap();
    context.store().ensure_config(&["SUPPORT_URL"], None);
    context.initialize().await.unwrap();
    assert!(context.store().diagnostics().is_empty());
}

#[tokio::test]
async fn test_default_requester_name() {
    let mut context = ConfigContext::builder()
        .with_initial_document(ConfigDocument::new())
        .build()
        .unwrap();
    context.store().ensure_config(&["A"], None);
    context.initialize().await.unwrap();

    assert_eq!(
        messages(&context),
        vec!["App configuration error: A is required by unspecified application code."]
    );
}

#[tokio::test]
async fn test_late_registration_policies() {
    let mut checked = ConfigContext::builder()
        .with_initial_document(ConfigDocument::new())
        .build()
        .unwrap();
    checked.initialize().await.unwrap();
    assert_eq!(
        checked.store().ensure_config(&["A"], Some("late")),
        EnsureOutcome::Checked {
            missing: vec!["A".to_string()]
        }
    );

    let mut ignored = ConfigContext::builder()
        .with_initial_document(ConfigDocument::new())
        .late_registration(LateRegistrationPolicy::Ignore)
        .build()
        .unwrap();
    ignored.initialize().await.unwrap();
    assert_eq!(
        ignored.store().ensure_config(&["A"], Some("late")),
        EnsureOutcome::Ignored
    );
    assert!(ignored.store().diagnostics().is_empty());
}

#[tokio::test]
async fn test_undefined_values_in_sources_are_diagnosed() {
    let mut context = ConfigContext::builder()
        .add_document(
            "header-handler",
            ConfigDocument::new()
                .with("HEADER_LOGO", ConfigValue::Undefined)
                .with("SITE_NAME", "Demo"),
        )
        .build()
        .unwrap();

    context.initialize().await.unwrap();

    let diagnostics = context.store().diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].diagnostic,
        ConfigDiagnostic::UndefinedValue {
            document: "header-handler".to_string(),
            keys: vec!["HEADER_LOGO".to_string()],
        }
    );
    let config = context.store().get_config();
    assert!(!config.contains("HEADER_LOGO"));
    assert_eq!(config.get_str("SITE_NAME").as_deref(), Some("Demo"));
}

#[tokio::test]
async fn test_subscriber_can_merge_during_initialized_event() {
    let mut context = ConfigContext::builder()
        .with_initial_document(ConfigDocument::new())
        .build()
        .unwrap();
    let store = context.store().clone();
    let sources = Arc::new(Mutex::new(Vec::new()));

    let sources_in = sources.clone();
    store.events().subscribe(ConfigTopic::ConfigChanged, move |event| {
        sources_in.lock().push(event.source.clone());
    });

    let store_in = store.clone();
    store
        .events()
        .subscribe(ConfigTopic::ConfigInitialized, move |_| {
            store_in.merge_config_named(
                ConfigDocument::new().with("DERIVED", "yes"),
                Some("post-init"),
            );
        });

    context.initialize().await.unwrap();

    assert_eq!(store.get_config().get_str("DERIVED").as_deref(), Some("yes"));
    assert_eq!(*sources.lock(), vec!["post-init".to_string()]);
}

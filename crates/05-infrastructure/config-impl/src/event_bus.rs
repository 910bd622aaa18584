//! 配置事件总线实现

use config_abstractions::events::{ConfigEvent, ConfigEventListener, ConfigTopic, SubscriptionId};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

type Callback = Arc<dyn Fn(&ConfigEvent) + Send + Sync>;

struct Subscription {
    id: SubscriptionId,
    topic: ConfigTopic,
    callback: Callback,
    once: bool,
}

/// 配置事件总线
///
/// 同步分发：`publish` 按订阅顺序依次调用当前订阅者后才返回。
/// 分发前先取订阅快照并释放锁，订阅者可以在回调中再次修改配置或发布事件，
/// 由此产生的嵌套发布同样是同步的，总线不做限流。
pub struct ConfigEventBus {
    subscriptions: Mutex<Vec<Subscription>>,
}

impl std::fmt::Debug for ConfigEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigEventBus")
            .field("subscriptions", &self.subscriptions.lock().len())
            .finish()
    }
}

impl ConfigEventBus {
    /// 创建新的事件总线
    pub fn new() -> Self {
        Self {
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    fn add<F>(&self, topic: ConfigTopic, callback: F, once: bool) -> SubscriptionId
    where
        F: Fn(&ConfigEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.subscriptions.lock().push(Subscription {
            id,
            topic,
            callback: Arc::new(callback),
            once,
        });
        debug!("订阅主题: {} ({})", topic, id);
        id
    }

    /// 订阅主题
    pub fn subscribe<F>(&self, topic: ConfigTopic, callback: F) -> SubscriptionId
    where
        F: Fn(&ConfigEvent) + Send + Sync + 'static,
    {
        self.add(topic, callback, false)
    }

    /// 订阅主题，只触发一次
    pub fn subscribe_once<F>(&self, topic: ConfigTopic, callback: F) -> SubscriptionId
    where
        F: Fn(&ConfigEvent) + Send + Sync + 'static,
    {
        self.add(topic, callback, true)
    }

    /// 注册事件监听器
    ///
    /// 为监听器感兴趣的每个主题各建立一个订阅。
    pub fn register_listener(&self, listener: Arc<dyn ConfigEventListener>) -> Vec<SubscriptionId> {
        info!("注册配置事件监听器: {}", listener.name());

        let mut topics = listener.interested_topics();
        if topics.is_empty() {
            topics = ConfigTopic::ALL.to_vec();
        }

        topics
            .into_iter()
            .map(|topic| {
                let listener = listener.clone();
                self.subscribe(topic, move |event| listener.on_event(event))
            })
            .collect()
    }

    /// 取消订阅
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.lock();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);

        if subscriptions.len() < before {
            debug!("取消订阅: {}", id);
            true
        } else {
            warn!("订阅不存在: {}", id);
            false
        }
    }

    /// 发布事件，返回被调用的订阅者数量
    pub fn publish(&self, event: &ConfigEvent) -> usize {
        let callbacks: Vec<Callback> = {
            let mut subscriptions = self.subscriptions.lock();
            let callbacks = subscriptions
                .iter()
                .filter(|s| s.topic == event.topic)
                .map(|s| s.callback.clone())
                .collect();
            subscriptions.retain(|s| !(s.once && s.topic == event.topic));
            callbacks
        };

        debug!("发布事件: {} -> {} 个订阅者", event.topic, callbacks.len());

        for callback in &callbacks {
            callback(event);
        }

        callbacks.len()
    }

    /// 获取主题的订阅者数量
    pub fn subscriber_count(&self, topic: ConfigTopic) -> usize {
        self.subscriptions
            .lock()
            .iter()
            .filter(|s| s.topic == topic)
            .count()
    }
}

impl Default for ConfigEventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// 日志记录事件监听器
///
/// 将所有配置事件记录到日志中
pub struct LoggingConfigEventListener {
    name: String,
    interested_topics: Vec<ConfigTopic>,
}

impl LoggingConfigEventListener {
    /// 创建新的日志记录监听器
    pub fn new() -> Self {
        Self {
            name: "LoggingConfigEventListener".to_string(),
            interested_topics: ConfigTopic::ALL.to_vec(),
        }
    }

    /// 设置感兴趣的主题
    pub fn with_topics(mut self, topics: Vec<ConfigTopic>) -> Self {
        self.interested_topics = topics;
        self
    }
}

impl Default for LoggingConfigEventListener {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigEventListener for LoggingConfigEventListener {
    fn on_event(&self, event: &ConfigEvent) {
        match event.topic {
            ConfigTopic::ConfigChanged => {
                info!(
                    "配置变更: {:?} from {} at {}",
                    event.change, event.source, event.timestamp
                );
            }
            ConfigTopic::ConfigInitialized => {
                info!("配置初始化完成: {} at {}", event.source, event.timestamp);
            }
            ConfigTopic::InitError => {
                warn!(
                    "配置初始化失败: {} at {}: {}",
                    event.source,
                    event.timestamp,
                    event.metadata.get("error").map(String::as_str).unwrap_or("unknown")
                );
            }
        }

        if !event.metadata.is_empty() {
            debug!("事件元数据: {:?}", event.metadata);
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn interested_topics(&self) -> Vec<ConfigTopic> {
        self.interested_topics.clone()
    }
}

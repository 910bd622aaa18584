//! 配置诊断记录

use config_abstractions::validator::{ConfigDiagnostic, DiagnosticRecord};
use parking_lot::Mutex;
use std::collections::VecDeque;
use tracing::warn;

/// 默认保留的诊断条数
pub const DEFAULT_DIAGNOSTICS_CAPACITY: usize = 256;

/// 诊断日志
///
/// 每条诊断都会以 warn 级别写入日志，并保留最近 `capacity` 条供调用方查询。
#[derive(Debug)]
pub struct DiagnosticsLog {
    records: Mutex<VecDeque<DiagnosticRecord>>,
    capacity: usize,
}

impl DiagnosticsLog {
    /// 创建最多保留 `capacity` 条记录的诊断日志，0 表示只写日志不保留
    pub fn new(capacity: usize) -> Self {
        let initial = capacity.min(DEFAULT_DIAGNOSTICS_CAPACITY);
        Self {
            records: Mutex::new(VecDeque::with_capacity(initial)),
            capacity,
        }
    }

    /// 记录诊断
    pub fn record(&self, diagnostic: ConfigDiagnostic) {
        for message in diagnostic.messages() {
            warn!("{}", message);
        }

        if self.capacity == 0 {
            return;
        }

        let mut records = self.records.lock();
        while records.len() >= self.capacity {
            records.pop_front();
        }
        records.push_back(DiagnosticRecord::new(diagnostic));
    }

    /// 获取诊断记录快照（按记录顺序）
    pub fn snapshot(&self) -> Vec<DiagnosticRecord> {
        self.records.lock().iter().cloned().collect()
    }

    /// 当前保留的记录数
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// 是否没有保留任何记录
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// 清空诊断记录
    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl Default for DiagnosticsLog {
    fn default() -> Self {
        Self::new(DEFAULT_DIAGNOSTICS_CAPACITY)
    }
}

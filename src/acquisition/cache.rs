// 结果缓存
//
// 以 (实体类型, 小写标识) 为键缓存归一化后的结果，按固定 TTL 失效。
// 条目只会整体替换，调用方拿到的是克隆，缓存内部状态不外泄

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use super::clock::Clock;

/// 缓存条目：值 + 写入时刻
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    stored_at: Instant,
}

/// 按 TTL 失效的内存缓存
///
/// 过期只由经过的时间决定，与访问次数无关；TTL 对整个缓存实例固定
#[derive(Clone)]
pub struct ResultCache<T> {
    entries: Arc<RwLock<HashMap<String, CacheEntry<T>>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<T: Clone> ResultCache<T> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            clock,
        }
    }

    /// 取值；仅当条目仍在 TTL 内时返回，过期条目惰性清除
    pub fn get(&self, key: &str) -> Option<T> {
        let now = self.clock.now();
        {
            let entries = self.entries.read().ok()?;
            let entry = entries.get(key)?;
            if now.duration_since(entry.stored_at) <= self.ttl {
                return Some(entry.data.clone());
            }
        }
        self.invalidate(key);
        None
    }

    /// 原子替换键下的条目，盖上当前时间戳
    pub fn set(&self, key: String, value: T) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(
                key,
                CacheEntry {
                    data: value,
                    stored_at: self.clock.now(),
                },
            );
        }
    }

    /// 移除条目；编排器在抓取失败时用它避免继续提供已知过期的数据
    pub fn invalidate(&self, key: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(key);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    /// 批量清除过期条目，由后台任务周期调用
    pub fn cleanup_expired(&self) {
        let now = self.clock.now();
        if let Ok(mut entries) = self.entries.write() {
            entries.retain(|_, entry| now.duration_since(entry.stored_at) <= self.ttl);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

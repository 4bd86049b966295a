use crate::domain::model::{CacheEntry, NutritionRecord};
use crate::domain::ports::KeyValueStore;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

/// 快取在 key-value 儲存中的 namespace
pub const CACHE_NAMESPACE: &str = "nutrition_cache_v7";

/// 超過 7 天的項目在載入時移除
pub const CACHE_EXPIRY_MS: i64 = 604_800_000;

/// 營養資料快取
///
/// 記憶體中的 map 是唯一的資料來源；每次 `put` 都會把整個 map 寫回儲存，
/// 但直到下次 `open` 之前都不會再讀取儲存內容。
pub struct ExpiringRecordCache<S: KeyValueStore> {
    store: S,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl<S: KeyValueStore> ExpiringRecordCache<S> {
    pub fn open(store: S) -> Self {
        Self::open_at(store, Utc::now())
    }

    pub fn open_at(store: S, now: DateTime<Utc>) -> Self {
        let entries = Self::load(&store, now);
        Self {
            store,
            entries: RwLock::new(entries),
        }
    }

    /// 讀取持久化的 map 並丟棄過期項目；任何讀取或解析錯誤都視為空快取
    pub fn load(store: &S, now: DateTime<Utc>) -> HashMap<String, CacheEntry> {
        let raw = match store.get(CACHE_NAMESPACE) {
            Ok(Some(raw)) => raw,
            Ok(None) => return HashMap::new(),
            Err(e) => {
                tracing::warn!("⚠️ Failed to read nutrition cache, starting empty: {}", e);
                return HashMap::new();
            }
        };

        let mut entries: HashMap<String, CacheEntry> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("⚠️ Malformed nutrition cache, starting empty: {}", e);
                return HashMap::new();
            }
        };

        let now_ms = now.timestamp_millis();
        let before = entries.len();
        // 時間戳損毀到無法計算年齡時視為過期
        entries.retain(|_, entry| {
            matches!(now_ms.checked_sub(entry.written_at), Some(age) if age <= CACHE_EXPIRY_MS)
        });

        tracing::debug!(
            "Loaded {} cached records ({} expired)",
            entries.len(),
            before - entries.len()
        );
        entries
    }

    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        self.read_entries().get(key).copied()
    }

    pub fn put(&self, key: &str, record: NutritionRecord) {
        self.put_at(key, record, Utc::now());
    }

    pub fn put_at(&self, key: &str, record: NutritionRecord, written_at: DateTime<Utc>) {
        let entry = CacheEntry {
            record,
            written_at: written_at.timestamp_millis(),
        };

        // 寫回儲存期間持有寫鎖，最後寫入的版本就是最後持久化的版本
        let mut entries = self.write_entries();
        entries.insert(key.to_string(), entry);

        match serde_json::to_string(&*entries) {
            Ok(blob) => {
                if let Err(e) = self.store.set(CACHE_NAMESPACE, &blob) {
                    tracing::warn!("⚠️ Failed to persist nutrition cache: {}", e);
                }
            }
            Err(e) => tracing::warn!("⚠️ Failed to serialize nutrition cache: {}", e),
        }
    }

    pub fn clear(&self) {
        self.write_entries().clear();
        if let Err(e) = self.store.remove(CACHE_NAMESPACE) {
            tracing::warn!("⚠️ Failed to remove persisted nutrition cache: {}", e);
        }
        tracing::info!("🗑️ Nutrition cache cleared");
    }

    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }

    fn read_entries(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_entries(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

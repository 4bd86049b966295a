use crate::domain::ports::KeyValueStore;
use crate::utils::error::{NutritionError, Result};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// 以目錄為基礎的儲存，每個 namespace 一個檔案
#[derive(Debug, Clone)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn path_for(&self, namespace: &str) -> Result<PathBuf> {
        let valid = !namespace.is_empty()
            && namespace
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(NutritionError::StorageError {
                namespace: namespace.to_string(),
                message: "namespace may only contain ASCII letters, digits, '_' and '-'".to_string(),
            });
        }
        Ok(self.base_path.join(format!("{}.json", namespace)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, namespace: &str) -> Result<Option<String>> {
        let path = self.path_for(namespace)?;
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, namespace: &str, value: &str) -> Result<()> {
        let path = self.path_for(namespace)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, value)?;
        Ok(())
    }

    fn remove(&self, namespace: &str) -> Result<()> {
        let path = self.path_for(namespace)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// 記憶體內的儲存，clone 之後共用同一份資料
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
    failing: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 開啟後所有寫入都會失敗（模擬配額用盡）
    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_writable(&self, namespace: &str) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NutritionError::StorageError {
                namespace: namespace.to_string(),
                message: "storage quota exceeded".to_string(),
            });
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, namespace: &str) -> Result<Option<String>> {
        Ok(self.values().get(namespace).cloned())
    }

    fn set(&self, namespace: &str, value: &str) -> Result<()> {
        self.check_writable(namespace)?;
        self.values().insert(namespace.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, namespace: &str) -> Result<()> {
        self.check_writable(namespace)?;
        self.values().remove(namespace);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("nested"));

        assert!(store.get("nutrition_cache_v7").unwrap().is_none());

        store.set("nutrition_cache_v7", "{\"a\":1}").unwrap();
        assert_eq!(store.get("nutrition_cache_v7").unwrap().as_deref(), Some("{\"a\":1}"));
        assert!(temp_dir.path().join("nested/nutrition_cache_v7.json").exists());

        store.remove("nutrition_cache_v7").unwrap();
        assert!(store.get("nutrition_cache_v7").unwrap().is_none());
    }

    #[test]
    fn test_file_store_remove_missing_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());
        assert!(store.remove("never_written").is_ok());
    }

    #[test]
    fn test_file_store_rejects_path_like_namespace() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        let err = store.set("../escape", "x").unwrap_err();
        assert!(matches!(err, NutritionError::StorageError { .. }));
    }

    #[test]
    fn test_memory_store_shared_between_clones() {
        let store = MemoryStore::new();
        let other = store.clone();

        store.set("theme", "light").unwrap();
        assert_eq!(other.get("theme").unwrap().as_deref(), Some("light"));

        other.fail_writes(true);
        assert!(store.set("theme", "dark").is_err());
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("light"));
    }
}

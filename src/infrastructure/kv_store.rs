//! 本地键值存储 - 基础设施层
//!
//! 只暴露"按 key 读写字符串"的能力，不认识 UserInfo

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::fs;

/// 键值存储
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// 读取 key 对应的值，不存在时返回 `None`
    async fn get(&self, key: &str) -> std::io::Result<Option<String>>;

    /// 写入（覆盖）key 对应的值
    async fn set(&self, key: &str, value: &str) -> std::io::Result<()>;

    /// 删除 key，不存在时视为成功
    async fn remove(&self, key: &str) -> std::io::Result<()>;
}

/// 基于文件的存储
///
/// 每个 key 对应目录下的一个 `<key>.json` 文件
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> std::io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn set(&self, key: &str, value: &str) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir).await?;
        fs::write(self.path_for(key), value).await
    }

    async fn remove(&self, key: &str) -> std::io::Result<()> {
        match fs::remove_file(self.path_for(key)).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// 内存存储
///
/// clone 后共享同一份数据，可模拟"重启后读取"
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // 写入不会在持锁期间 panic，中毒时直接沿用数据
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> std::io::Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> std::io::Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> std::io::Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.get("user").await.unwrap(), None);

        store.set("user", "{\"name\":\"Asha\"}").await.unwrap();
        assert_eq!(
            store.get("user").await.unwrap().as_deref(),
            Some("{\"name\":\"Asha\"}")
        );

        store.remove("user").await.unwrap();
        assert_eq!(store.get("user").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_missing_key_is_ok() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        tokio_test::assert_ok!(store.remove("missing").await);
    }

    #[tokio::test]
    async fn test_memory_store_clones_share_data() {
        let store = MemoryStore::new();
        let other = store.clone();

        store.set("k", "v").await.unwrap();
        assert_eq!(other.get("k").await.unwrap().as_deref(), Some("v"));

        other.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}

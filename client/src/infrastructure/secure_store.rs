//! 进程内安全存储
//!
//! 测试与开发宿主用的 SecureStore 实现；真机上由平台侧
//! （Keychain/Keystore 桥接）提供同一接口。

use std::collections::HashMap;

use async_trait::async_trait;
use gavel_errors::AppResult;
use gavel_ports::SecureStore;
use tokio::sync::RwLock;

/// 内存键值存储
#[derive(Default)]
pub struct MemorySecureStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySecureStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecureStore for MemorySecureStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = MemorySecureStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", "true").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("true".to_string()));

        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}

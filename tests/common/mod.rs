//! 集成测试共用的存储构造

#![allow(dead_code)]

use std::sync::Arc;

use shorturl::storage::backend::retry::RetryConfig;
use shorturl::storage::{MemoryStorage, SeaOrmStorage, UrlStore};
use tempfile::TempDir;

/// 存储实例和（可能存在的）临时目录，目录需要与存储同生命周期
pub struct TestStore {
    pub store: Arc<dyn UrlStore>,
    pub _dir: Option<TempDir>,
}

pub async fn memory_store() -> TestStore {
    TestStore {
        store: Arc::new(MemoryStorage::new()),
        _dir: None,
    }
}

pub fn sqlite_url(dir: &TempDir) -> String {
    let db_path = dir.path().join("shorturl_test.db");
    format!("sqlite://{}?mode=rwc", db_path.display())
}

pub async fn sqlite_store() -> TestStore {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage = SeaOrmStorage::new(&sqlite_url(&temp_dir), RetryConfig::default())
        .await
        .expect("Failed to create storage");

    TestStore {
        store: Arc::new(storage),
        _dir: Some(temp_dir),
    }
}

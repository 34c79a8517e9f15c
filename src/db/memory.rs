use super::store::{Collection, DocRef, Document, DocumentStore, WriteBatch, WriteOp};
use crate::error::StoreError;
use async_trait::async_trait;
use dashmap::DashMap;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// 进程内文档存储 (memory 后端 / 测试)
#[derive(Debug)]
pub struct MemoryDocumentStore {
    collections: DashMap<Collection, IndexMap<String, Map<String, Value>>>,
    available: AtomicBool,
    /// 第 N 次提交 (从 1 开始) 失败
    fail_on_commit: AtomicUsize,
    commit_attempts: AtomicUsize,
    /// 每次成功提交的批次大小
    commit_log: Mutex<Vec<usize>>,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            collections: DashMap::new(),
            available: AtomicBool::new(true),
            fail_on_commit: AtomicUsize::new(0),
            commit_attempts: AtomicUsize::new(0),
            commit_log: Mutex::new(Vec::new()),
        }
    }

    /// 写入 (覆盖) 一个文档
    pub fn insert(&self, collection: Collection, id: impl Into<String>, fields: Value) {
        let fields = match fields {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.collections
            .entry(collection)
            .or_default()
            .insert(id.into(), fields);
    }

    pub fn get(&self, collection: Collection, id: &str) -> Option<Map<String, Value>> {
        self.collections
            .get(&collection)
            .and_then(|docs| docs.get(id).cloned())
    }

    pub fn count(&self, collection: Collection) -> usize {
        self.collections.get(&collection).map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// 让第 `attempt` 次提交失败 (0 表示不注入故障)
    pub fn fail_on_commit(&self, attempt: usize) {
        self.fail_on_commit.store(attempt, Ordering::SeqCst);
    }

    pub fn commit_log(&self) -> Vec<usize> {
        self.commit_log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store switched off".to_string()))
        }
    }

    fn exists(&self, doc: &DocRef) -> bool {
        self.collections
            .get(&doc.collection)
            .map(|docs| docs.contains_key(&doc.id))
            .unwrap_or(false)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        self.check_available()?;
        Ok(self
            .collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        self.check_available()?;

        let attempt = self.commit_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_commit.load(Ordering::SeqCst) == attempt {
            return Err(StoreError::Rejected(format!("injected failure on commit {}", attempt)));
        }

        // 先校验再落地, 保证整批原子
        for op in batch.ops() {
            if let WriteOp::Update(doc, _) = op {
                if !self.exists(doc) {
                    return Err(StoreError::NotFound {
                        collection: doc.collection.as_str(),
                        id: doc.id.clone(),
                    });
                }
            }
        }

        let size = batch.len();
        for op in batch.into_ops() {
            match op {
                WriteOp::Delete(doc) => {
                    if let Some(mut docs) = self.collections.get_mut(&doc.collection) {
                        docs.shift_remove(&doc.id);
                    }
                }
                WriteOp::Update(doc, fields) => {
                    if let Some(mut docs) = self.collections.get_mut(&doc.collection) {
                        if let Some(existing) = docs.get_mut(&doc.id) {
                            existing.extend(fields);
                        }
                    }
                }
            }
        }

        if let Ok(mut log) = self.commit_log.lock() {
            log.push(size);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn update_of_missing_document_rejects_whole_batch() {
        let store = MemoryDocumentStore::new();
        store.insert(Collection::LedgerEntries, "a", json!({ "amount": 1 }));

        let mut batch = WriteBatch::new();
        batch.delete(DocRef::new(Collection::LedgerEntries, "a"));
        batch.update(DocRef::new(Collection::Orders, "missing"), Map::new());

        let err = store.commit(batch).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert_eq!(store.count(Collection::LedgerEntries), 1);
        assert!(store.commit_log().is_empty());
    }

    #[tokio::test]
    async fn update_merges_fields() {
        let store = MemoryDocumentStore::new();
        store.insert(Collection::Orders, "o1", json!({ "profit": 10, "adjustmentAmount": 5 }));

        let mut fields = Map::new();
        fields.insert("adjustmentAmount".to_string(), json!(0));
        let mut batch = WriteBatch::new();
        batch.update(DocRef::new(Collection::Orders, "o1"), fields);
        store.commit(batch).await.unwrap();

        let doc = store.get(Collection::Orders, "o1").unwrap();
        assert_eq!(doc["profit"], json!(10));
        assert_eq!(doc["adjustmentAmount"], json!(0));
        assert_eq!(store.commit_log(), vec![1]);
    }

    #[tokio::test]
    async fn unavailable_store_refuses_reads() {
        let store = MemoryDocumentStore::new();
        store.set_available(false);
        assert!(store.ping().await.unwrap_err().is_unavailable());
        assert!(store.list(Collection::Orders).await.is_err());
    }
}

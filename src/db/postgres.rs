use super::store::{Collection, Document, DocumentStore, WriteBatch, WriteOp};
use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::PgPool;
use std::time::{Duration, Instant};

const COMMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// 基于 PostgreSQL JSONB 表的文档存储
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn apply(&self, batch: WriteBatch) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut affected = 0u64;

        for op in batch.into_ops() {
            match op {
                WriteOp::Delete(doc) => {
                    let result = sqlx::query(
                        "DELETE FROM documents WHERE collection = $1 AND id = $2"
                    )
                    .bind(doc.collection.as_str())
                    .bind(&doc.id)
                    .execute(&mut *tx)
                    .await?;
                    affected += result.rows_affected();
                }
                WriteOp::Update(doc, fields) => {
                    // data || patch: 局部字段覆盖
                    let result = sqlx::query(
                        "UPDATE documents SET data = data || $3 WHERE collection = $1 AND id = $2"
                    )
                    .bind(doc.collection.as_str())
                    .bind(&doc.id)
                    .bind(Json(Value::Object(fields)))
                    .execute(&mut *tx)
                    .await?;
                    if result.rows_affected() == 0 {
                        // tx 被丢弃即回滚
                        return Err(StoreError::NotFound {
                            collection: doc.collection.as_str(),
                            id: doc.id,
                        });
                    }
                    affected += result.rows_affected();
                }
            }
        }

        tx.commit().await?;
        Ok(affected)
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let rows = sqlx::query_as::<_, (String, Json<Map<String, Value>>)>(
            r#"
            SELECT id, data
            FROM documents
            WHERE collection = $1
            ORDER BY id
            "#
        )
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, Json(fields))| Document::new(id, fields))
            .collect())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }

        let size = batch.len();
        tracing::debug!("开始提交批次, {} 个操作", size);
        let start_time = Instant::now();

        // 添加超时控制: 30秒
        match tokio::time::timeout(COMMIT_TIMEOUT, self.apply(batch)).await {
            Ok(Ok(affected)) => {
                tracing::debug!("✓ 批次提交成功, {} 个操作, 影响 {} 行, 耗时: {:?}", size, affected, start_time.elapsed());
                Ok(())
            }
            Ok(Err(e)) => {
                tracing::error!("✗ 批次提交失败, 耗时: {:?}, 错误: {:?}", start_time.elapsed(), e);
                Err(e)
            }
            Err(_) => {
                tracing::error!("✗ 批次提交超时 (>{:?})!", COMMIT_TIMEOUT);
                Err(StoreError::Timeout(COMMIT_TIMEOUT))
            }
        }
    }
}

use crate::db::{Collection, DocRef, DocumentStore, WriteBatch};
use crate::error::{MaintenanceError, StoreError};
use crate::models::amount::parse_amount;
use crate::models::{ClearOptions, ClearReport};
use bigdecimal::Zero;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Instant;

/// 单批最大写操作数 (存储端单次原子提交上限约 500, 留出余量)
pub const MAX_BATCH_SIZE: usize = 450;

/// 批量清理服务
///
/// 同一存储上的并发调用需由调用方串行化.
pub struct BulkMaintenance {
    store: Arc<dyn DocumentStore>,
    max_batch_size: usize,
}

impl BulkMaintenance {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            max_batch_size: MAX_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size.max(1);
        self
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// 严格模式: 存储不可用时返回 `MaintenanceError::Unavailable`
    pub async fn clear_financials(&self, options: ClearOptions) -> Result<ClearReport, MaintenanceError> {
        if let Err(e) = self.store.ping().await {
            tracing::error!("Cannot clear financials, document store unavailable: {}", e);
            return Err(MaintenanceError::Unavailable(e.to_string()));
        }

        tracing::info!("开始清理财务数据: {:?}", options);
        let start_time = Instant::now();
        let mut writer = BatchWriter::new(self.store.as_ref(), self.max_batch_size);

        if options.clear_ledger {
            self.stage_delete_all(&mut writer, Collection::LedgerEntries).await?;
        }
        if options.clear_party_payments {
            self.stage_delete_all(&mut writer, Collection::PartyPayments).await?;
        }
        if options.clear_activity_logs {
            self.stage_delete_all(&mut writer, Collection::LedgerActivities).await?;
            self.stage_delete_all(&mut writer, Collection::InvestmentActivity).await?;
        }
        if options.clear_investment {
            self.stage_delete_all(&mut writer, Collection::Investment).await?;
        }

        // 删除订单与清空订单付款互斥
        if options.clear_orders {
            self.stage_delete_all(&mut writer, Collection::Orders).await?;
        } else if options.clear_order_payments {
            self.stage_order_resets(&mut writer).await?;
        }

        writer.flush().await?;

        let report = writer.into_report();
        tracing::info!(
            "财务数据清理完成: 提交 {} 批, 删除 {} 个文档, 重置 {} 个订单, 耗时: {:?}",
            report.batches_committed, report.documents_deleted, report.orders_reset, start_time.elapsed()
        );
        Ok(report)
    }

    /// 宽松模式: 存储不可用时记录日志并返回 `Ok(None)`, 提交失败仍然返回错误
    pub async fn clear_financials_lenient(&self, options: ClearOptions) -> Result<Option<ClearReport>, MaintenanceError> {
        match self.clear_financials(options).await {
            Ok(report) => Ok(Some(report)),
            Err(MaintenanceError::Unavailable(reason)) => {
                tracing::warn!("Skipping financial clear, nothing was changed: {}", reason);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn read(&self, collection: Collection) -> Result<Vec<crate::db::Document>, MaintenanceError> {
        self.store.list(collection).await.map_err(|source| MaintenanceError::Read {
            collection: collection.as_str(),
            source,
        })
    }

    async fn stage_delete_all(&self, writer: &mut BatchWriter<'_>, collection: Collection) -> Result<(), MaintenanceError> {
        let docs = self.read(collection).await?;
        tracing::info!("集合 {} 待删除 {} 个文档", collection.as_str(), docs.len());

        for doc in docs {
            writer.delete(DocRef::new(collection, doc.id)).await?;
        }
        Ok(())
    }

    /// 只更新确实有付款或手工调整的订单
    async fn stage_order_resets(&self, writer: &mut BatchWriter<'_>) -> Result<(), MaintenanceError> {
        let docs = self.read(Collection::Orders).await?;
        let mut skipped = 0usize;

        // 直接看原始字段, 其余字段的格式不影响判断
        for doc in docs {
            if !needs_payment_reset(&doc.fields) {
                skipped += 1;
                continue;
            }
            writer.reset_payments(DocRef::new(Collection::Orders, doc.id)).await?;
        }

        tracing::info!("订单付款清理: 跳过 {} 个无需更新的订单", skipped);
        Ok(())
    }
}

/// 有原材料付款 / 客户付款 / 非零手工调整
fn needs_payment_reset(fields: &Map<String, Value>) -> bool {
    has_entries(fields.get("partialPayments"))
        || has_entries(fields.get("customerPayments"))
        || fields
            .get("adjustmentAmount")
            .map(|value| !parse_amount(value).is_zero())
            .unwrap_or(false)
}

fn has_entries(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        _ => false,
    }
}

fn payment_reset_fields() -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("partialPayments".to_string(), json!([]));
    fields.insert("customerPayments".to_string(), json!([]));
    fields.insert("adjustmentAmount".to_string(), json!(0));
    fields
}

/// 共享批次 + 计数器, 满额即提交
struct BatchWriter<'a> {
    store: &'a dyn DocumentStore,
    batch: WriteBatch,
    max_batch_size: usize,
    report: ClearReport,
    staged_deletes: usize,
    staged_resets: usize,
}

impl<'a> BatchWriter<'a> {
    fn new(store: &'a dyn DocumentStore, max_batch_size: usize) -> Self {
        Self {
            store,
            batch: WriteBatch::new(),
            max_batch_size,
            report: ClearReport::default(),
            staged_deletes: 0,
            staged_resets: 0,
        }
    }

    async fn delete(&mut self, doc: DocRef) -> Result<(), MaintenanceError> {
        self.batch.delete(doc);
        self.staged_deletes += 1;
        self.flush_if_full().await
    }

    async fn reset_payments(&mut self, doc: DocRef) -> Result<(), MaintenanceError> {
        self.batch.update(doc, payment_reset_fields());
        self.staged_resets += 1;
        self.flush_if_full().await
    }

    async fn flush_if_full(&mut self) -> Result<(), MaintenanceError> {
        if self.batch.len() >= self.max_batch_size {
            self.flush().await?;
        }
        Ok(())
    }

    /// 提交已暂存的操作; 空批次不提交
    async fn flush(&mut self) -> Result<(), MaintenanceError> {
        if self.batch.is_empty() {
            return Ok(());
        }

        let batch = std::mem::take(&mut self.batch);
        let size = batch.len();
        let number = self.report.batches_committed + 1;
        let start_time = Instant::now();

        self.store
            .commit(batch)
            .await
            .map_err(|source: StoreError| MaintenanceError::Commit {
                batch: number,
                committed: self.report.batches_committed,
                source,
            })?;

        self.report.batches_committed = number;
        self.report.documents_deleted += std::mem::take(&mut self.staged_deletes);
        self.report.orders_reset += std::mem::take(&mut self.staged_resets);
        tracing::info!("✓ 第 {} 批提交成功, {} 个操作, 耗时: {:?}", number, size, start_time.elapsed());
        Ok(())
    }

    fn into_report(self) -> ClearReport {
        self.report
    }
}

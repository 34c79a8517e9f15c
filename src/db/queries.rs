use super::store::{Collection, Document, DocumentStore};
use crate::error::StoreError;
use crate::models::{LedgerEntry, Order};
use serde::de::DeserializeOwned;

/// 查询全部订单
pub async fn load_orders(store: &dyn DocumentStore) -> Result<Vec<Order>, StoreError> {
    let docs = store.list(Collection::Orders).await?;
    Ok(decode_all(Collection::Orders, &docs))
}

/// 查询全部账本条目
pub async fn load_ledger_entries(store: &dyn DocumentStore) -> Result<Vec<LedgerEntry>, StoreError> {
    let docs = store.list(Collection::LedgerEntries).await?;
    Ok(decode_all(Collection::LedgerEntries, &docs))
}

/// 解码失败的文档跳过并告警
fn decode_all<T: DeserializeOwned>(collection: Collection, docs: &[Document]) -> Vec<T> {
    docs.iter()
        .filter_map(|doc| match doc.decode::<T>() {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping undecodable document {}/{}: {}", collection.as_str(), doc.id, e);
                None
            }
        })
        .collect()
}

use crate::error::StoreError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// 文档集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Orders,
    LedgerEntries,
    PartyPayments,
    LedgerActivities,
    Investment,
    InvestmentActivity,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Orders => "orders",
            Collection::LedgerEntries => "ledgerEntries",
            Collection::PartyPayments => "partyPayments",
            Collection::LedgerActivities => "ledgerActivities",
            Collection::Investment => "investment",
            Collection::InvestmentActivity => "investmentActivity",
        }
    }
}

/// 文档快照: id + 字段
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self { id: id.into(), fields }
    }

    /// 解码为业务结构, 文档 id 覆盖字段中的 id
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        let mut fields = self.fields.clone();
        fields.insert("id".to_string(), Value::String(self.id.clone()));
        serde_json::from_value(Value::Object(fields))
    }
}

/// 文档引用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocRef {
    pub collection: Collection,
    pub id: String,
}

impl DocRef {
    pub fn new(collection: Collection, id: impl Into<String>) -> Self {
        Self { collection, id: id.into() }
    }
}

/// 暂存的写操作
#[derive(Debug, Clone)]
pub enum WriteOp {
    Delete(DocRef),
    /// 局部字段覆盖, 文档不存在时整批失败
    Update(DocRef, Map<String, Value>),
}

/// 待提交的写批次
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delete(&mut self, doc: DocRef) {
        self.ops.push(WriteOp::Delete(doc));
    }

    pub fn update(&mut self, doc: DocRef, fields: Map<String, Value>) {
        self.ops.push(WriteOp::Update(doc, fields));
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// 事务型文档存储
///
/// 只依赖三个原语: 按集合全量查询, 暂存删除/更新, 原子提交.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 可用性探测, 不可用时返回 `StoreError::Unavailable`
    async fn ping(&self) -> Result<(), StoreError>;

    async fn list(&self, collection: Collection) -> Result<Vec<Document>, StoreError>;

    /// 原子提交: 要么全部生效, 要么全部不生效
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
}

pub mod memory;
pub mod pool;
pub mod postgres;
pub mod queries;
pub mod store;

pub use memory::MemoryDocumentStore;
pub use pool::{create_pool, ensure_schema};
pub use postgres::PgDocumentStore;
pub use queries::*;
pub use store::{Collection, DocRef, Document, DocumentStore, WriteBatch, WriteOp};

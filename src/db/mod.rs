pub mod memory;
pub mod pool;
pub mod queries;
pub mod store;

pub use memory::MemoryInventoryStore;
pub use pool::create_pool;
pub use queries::*;
pub use store::{InventoryStore, PgInventoryStore, StoreError};

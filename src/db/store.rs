use crate::db::queries;
use crate::models::{InspectionRecord, RequestBatchItem};
use async_trait::async_trait;
use sqlx::PgPool;

/// 存储层错误 - 远端错误原样上抛, 本层不重试不恢复
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// 库存表存储接口
/// 实现者: PgInventoryStore (生产, sqlx/PostgreSQL), MemoryInventoryStore (测试)
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// 新建巡检记录, 返回带库分配 ID 的记录
    async fn create_record(&self, record: &InspectionRecord)
        -> Result<InspectionRecord, StoreError>;

    /// 读取全部巡检记录
    async fn list_records(&self) -> Result<Vec<InspectionRecord>, StoreError>;

    /// 全字段更新一条巡检记录
    async fn update_record(
        &self,
        inspection_id: i64,
        fields: &InspectionRecord,
    ) -> Result<(), StoreError>;

    /// 只更新请领数量
    async fn update_request_amount(
        &self,
        inspection_id: i64,
        amount: i32,
    ) -> Result<(), StoreError>;

    /// 删除巡检记录
    async fn delete_record(&self, inspection_id: i64) -> Result<(), StoreError>;

    /// 当前最大请领单号, 无批次时 None
    async fn latest_order_number(&self) -> Result<Option<String>, StoreError>;

    /// 整批插入请领明细 (单次调用)
    async fn insert_request_batch(&self, rows: &[RequestBatchItem]) -> Result<(), StoreError>;
}

/// PostgreSQL 存储实现
pub struct PgInventoryStore {
    pool: PgPool,
}

impl PgInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InventoryStore for PgInventoryStore {
    async fn create_record(
        &self,
        record: &InspectionRecord,
    ) -> Result<InspectionRecord, StoreError> {
        Ok(queries::create_inspection(&self.pool, record).await?)
    }

    async fn list_records(&self) -> Result<Vec<InspectionRecord>, StoreError> {
        Ok(queries::list_inspections(&self.pool).await?)
    }

    async fn update_record(
        &self,
        inspection_id: i64,
        fields: &InspectionRecord,
    ) -> Result<(), StoreError> {
        Ok(queries::update_inspection(&self.pool, inspection_id, fields).await?)
    }

    async fn update_request_amount(
        &self,
        inspection_id: i64,
        amount: i32,
    ) -> Result<(), StoreError> {
        Ok(queries::update_request_amount(&self.pool, inspection_id, amount).await?)
    }

    async fn delete_record(&self, inspection_id: i64) -> Result<(), StoreError> {
        Ok(queries::delete_inspection(&self.pool, inspection_id).await?)
    }

    async fn latest_order_number(&self) -> Result<Option<String>, StoreError> {
        Ok(queries::latest_order_number(&self.pool).await?)
    }

    async fn insert_request_batch(&self, rows: &[RequestBatchItem]) -> Result<(), StoreError> {
        Ok(queries::insert_request_batch(&self.pool, rows).await?)
    }
}

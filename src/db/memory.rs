use crate::db::store::{InventoryStore, StoreError};
use crate::models::{InspectionRecord, RequestBatchItem};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// 进程内存储实现 - 与 PgInventoryStore 同一接口, 供测试驱动完整流程。
/// 支持按 ID 注入单点写失败, 用于验证两阶段的 fail-closed 行为。
#[derive(Default)]
pub struct MemoryInventoryStore {
    inspections: Mutex<IndexMap<i64, InspectionRecord>>,
    requests: Mutex<Vec<RequestBatchItem>>,
    writes: AtomicUsize,
    fail_amount_update_for: Mutex<Option<i64>>,
    fail_batch_insert: Mutex<bool>,
}

impl MemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<InspectionRecord>) -> Self {
        let store = Self::new();
        {
            let mut inspections = store.inspections.lock().unwrap();
            for record in records {
                inspections.insert(record.inspection_id, record);
            }
        }
        store
    }

    /// 让后续对指定 ID 的 update_request_amount 调用失败
    pub fn fail_amount_update_for(&self, inspection_id: i64) {
        *self.fail_amount_update_for.lock().unwrap() = Some(inspection_id);
    }

    /// 让后续的 insert_request_batch 调用失败
    pub fn fail_batch_insert(&self) {
        *self.fail_batch_insert.lock().unwrap() = true;
    }

    /// 清除全部注入的失败
    pub fn clear_failures(&self) {
        *self.fail_amount_update_for.lock().unwrap() = None;
        *self.fail_batch_insert.lock().unwrap() = false;
    }

    /// 成功落库的写操作次数
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn record(&self, inspection_id: i64) -> Option<InspectionRecord> {
        self.inspections.lock().unwrap().get(&inspection_id).cloned()
    }

    pub fn request_rows(&self) -> Vec<RequestBatchItem> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl InventoryStore for MemoryInventoryStore {
    async fn create_record(
        &self,
        record: &InspectionRecord,
    ) -> Result<InspectionRecord, StoreError> {
        let mut inspections = self.inspections.lock().unwrap();
        let next_id = inspections.keys().max().copied().unwrap_or(0) + 1;
        let mut created = record.clone();
        created.inspection_id = next_id;
        inspections.insert(next_id, created.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(created)
    }

    async fn list_records(&self) -> Result<Vec<InspectionRecord>, StoreError> {
        Ok(self.inspections.lock().unwrap().values().cloned().collect())
    }

    async fn update_record(
        &self,
        inspection_id: i64,
        fields: &InspectionRecord,
    ) -> Result<(), StoreError> {
        let mut inspections = self.inspections.lock().unwrap();
        match inspections.get_mut(&inspection_id) {
            Some(record) => {
                *record = fields.clone();
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            None => Err(format!("inspection {} not found", inspection_id).into()),
        }
    }

    async fn update_request_amount(
        &self,
        inspection_id: i64,
        amount: i32,
    ) -> Result<(), StoreError> {
        if *self.fail_amount_update_for.lock().unwrap() == Some(inspection_id) {
            return Err(format!("simulated store failure on inspection {}", inspection_id).into());
        }
        let mut inspections = self.inspections.lock().unwrap();
        match inspections.get_mut(&inspection_id) {
            Some(record) => {
                record.request_amount = amount;
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            None => Err(format!("inspection {} not found", inspection_id).into()),
        }
    }

    async fn delete_record(&self, inspection_id: i64) -> Result<(), StoreError> {
        let mut inspections = self.inspections.lock().unwrap();
        match inspections.shift_remove(&inspection_id) {
            Some(_) => {
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            None => Err(format!("inspection {} not found", inspection_id).into()),
        }
    }

    async fn latest_order_number(&self) -> Result<Option<String>, StoreError> {
        let requests = self.requests.lock().unwrap();
        Ok(requests
            .iter()
            .map(|row| row.request_order_number.clone())
            .max())
    }

    async fn insert_request_batch(&self, rows: &[RequestBatchItem]) -> Result<(), StoreError> {
        if *self.fail_batch_insert.lock().unwrap() {
            return Err("simulated batch insert failure".into());
        }
        self.requests.lock().unwrap().extend_from_slice(rows);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

use crate::db::store::{InventoryStore, StoreError};
use crate::models::{next_order_number, InspectionRecord, RequestBatchItem};
use std::sync::Arc;

/// Phase 1 结果: 无候选时不发生任何存储写入
pub enum PreviewOutcome {
    Empty,
    Candidates(Vec<InspectionRecord>),
}

/// Phase 2 回执
#[derive(Debug, Clone)]
pub struct SubmitReceipt {
    pub order_number: String,
    pub item_count: usize,
}

/// 从当前记录集挑出请领数量 > 0 的记录, 保持输入顺序
pub fn select_candidates(records: &[InspectionRecord]) -> Vec<InspectionRecord> {
    records
        .iter()
        .filter(|record| record.request_amount > 0)
        .cloned()
        .collect()
}

/// 请领单编译器 - 两阶段均 fail-closed: 任一存储调用失败即中止本阶段,
/// 不再发起后续写入。
pub struct RequestCompiler {
    store: Arc<dyn InventoryStore>,
}

impl RequestCompiler {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Phase 1 - 预览: 挑选候选并把各自的请领数量逐条顺序落库,
    /// 全部成功后返回候选快照供复核。
    pub async fn preview(
        &self,
        records: &[InspectionRecord],
    ) -> Result<PreviewOutcome, StoreError> {
        let candidates = select_candidates(records);
        if candidates.is_empty() {
            return Ok(PreviewOutcome::Empty);
        }

        for item in &candidates {
            self.store
                .update_request_amount(item.inspection_id, item.request_amount)
                .await?;
        }

        tracing::info!("[RequestCompiler] 预览完成, {} 个候选", candidates.len());
        Ok(PreviewOutcome::Candidates(candidates))
    }

    /// Phase 2 - 提交: 取当前最大单号算出下一个 (4位补零, 整批共用),
    /// 整批插入请领明细, 再逐条把来源记录的请领数量清零。
    /// 批次插入失败时不做任何清零; 清零中途失败属已接受的非原子缺口,
    /// 已清零的保持清零, 重新提交即为恢复路径。item_quantity 不做扣减。
    pub async fn submit(
        &self,
        candidates: &[InspectionRecord],
    ) -> Result<SubmitReceipt, StoreError> {
        let latest = self.store.latest_order_number().await?;
        let order_number = next_order_number(latest.as_deref());

        let rows: Vec<RequestBatchItem> = candidates
            .iter()
            .map(|record| RequestBatchItem::from_record(record, &order_number))
            .collect();

        self.store.insert_request_batch(&rows).await?;

        for item in candidates {
            self.store
                .update_request_amount(item.inspection_id, 0)
                .await?;
        }

        tracing::info!(
            "[RequestCompiler] 提交完成, 单号 {}, {} 条明细",
            order_number,
            rows.len()
        );
        Ok(SubmitReceipt {
            order_number,
            item_count: rows.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryInventoryStore;
    use crate::models::{Inspector, KitStatus, Location, Unit};
    use chrono::NaiveDate;

    fn record(id: i64, request_amount: i32) -> InspectionRecord {
        InspectionRecord {
            inspection_id: id,
            picture_url: format!("https://cdn.example.com/kit{}.jpg", id),
            item_inspected: format!("Item {}", id),
            item_quantity: 10,
            unit: Unit::Pack,
            expiry_date: NaiveDate::from_ymd_opt(2027, 6, 1).unwrap(),
            request_amount,
            location: Location::MainOffice,
            inspection_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            inspected_by: Inspector::JohnDoe,
            kit_condition: "Good".to_string(),
            next_inspection_date: NaiveDate::from_ymd_opt(2026, 7, 5).unwrap(),
            status: KitStatus::Passed,
            description: "General stock".to_string(),
        }
    }

    #[test]
    fn candidates_are_the_nonzero_amounts_in_order() {
        let records = vec![record(1, 0), record(2, 2), record(3, 0), record(4, 5)];
        let candidates = select_candidates(&records);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].inspection_id, 2);
        assert_eq!(candidates[1].inspection_id, 4);
    }

    #[tokio::test]
    async fn empty_preview_writes_nothing() {
        let store = Arc::new(MemoryInventoryStore::with_records(vec![
            record(1, 0),
            record(2, 0),
        ]));
        let compiler = RequestCompiler::new(store.clone());

        let outcome = compiler.preview(&[record(1, 0), record(2, 0)]).await.unwrap();
        assert!(matches!(outcome, PreviewOutcome::Empty));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn preview_persists_each_candidate_amount() {
        let store = Arc::new(MemoryInventoryStore::with_records(vec![
            record(1, 0),
            record(2, 0),
        ]));
        let compiler = RequestCompiler::new(store.clone());

        let records = vec![record(1, 3), record(2, 0)];
        let outcome = compiler.preview(&records).await.unwrap();
        match outcome {
            PreviewOutcome::Candidates(candidates) => {
                assert_eq!(candidates.len(), 1);
                assert_eq!(candidates[0].inspection_id, 1);
                assert_eq!(candidates[0].request_amount, 3);
            }
            PreviewOutcome::Empty => panic!("expected candidates"),
        }
        // 预览把本地请领数量写回了存储
        assert_eq!(store.record(1).unwrap().request_amount, 3);
    }

    #[tokio::test]
    async fn preview_aborts_on_first_failed_write() {
        let store = Arc::new(MemoryInventoryStore::with_records(vec![
            record(1, 0),
            record(2, 0),
        ]));
        store.fail_amount_update_for(1);
        let compiler = RequestCompiler::new(store.clone());

        let records = vec![record(1, 3), record(2, 4)];
        assert!(compiler.preview(&records).await.is_err());
        // 第一条即失败, 第二条不再写
        assert_eq!(store.write_count(), 0);
        assert_eq!(store.record(2).unwrap().request_amount, 0);
    }

    #[tokio::test]
    async fn submit_tags_batch_and_resets_amounts() {
        let store = Arc::new(MemoryInventoryStore::with_records(vec![
            record(1, 3),
            record(2, 0),
        ]));
        let compiler = RequestCompiler::new(store.clone());

        let receipt = compiler.submit(&[record(1, 3)]).await.unwrap();
        assert_eq!(receipt.order_number, "0001");
        assert_eq!(receipt.item_count, 1);

        let rows = store.request_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].inspection_id, 1);
        assert_eq!(rows[0].request_order_number, "0001");
        assert_eq!(rows[0].request_amount, 3);

        let after = store.record(1).unwrap();
        assert_eq!(after.request_amount, 0);
        assert_eq!(after.item_quantity, 10); // 库存数量不扣减
    }

    #[tokio::test]
    async fn submit_continues_numbering_from_existing_batches() {
        let store = Arc::new(MemoryInventoryStore::with_records(vec![record(1, 2)]));
        let compiler = RequestCompiler::new(store.clone());
        store
            .insert_request_batch(&[RequestBatchItem::from_record(&record(9, 1), "0007")])
            .await
            .unwrap();

        let receipt = compiler.submit(&[record(1, 2)]).await.unwrap();
        assert_eq!(receipt.order_number, "0008");
    }

    #[tokio::test]
    async fn failed_batch_insert_resets_nothing() {
        let store = Arc::new(MemoryInventoryStore::with_records(vec![record(1, 3)]));
        store.fail_batch_insert();
        let compiler = RequestCompiler::new(store.clone());

        assert!(compiler.submit(&[record(1, 3)]).await.is_err());
        assert!(store.request_rows().is_empty());
        assert_eq!(store.record(1).unwrap().request_amount, 3);
    }

    #[tokio::test]
    async fn reset_failure_mid_sequence_leaves_partial_state() {
        let store = Arc::new(MemoryInventoryStore::with_records(vec![
            record(1, 3),
            record(2, 4),
            record(3, 5),
        ]));
        store.fail_amount_update_for(2);
        let compiler = RequestCompiler::new(store.clone());

        let candidates = vec![record(1, 3), record(2, 4), record(3, 5)];
        assert!(compiler.submit(&candidates).await.is_err());

        // 批次已写入, 清零停在失败处: 1 已清零, 2/3 保持原值
        assert_eq!(store.request_rows().len(), 3);
        assert_eq!(store.record(1).unwrap().request_amount, 0);
        assert_eq!(store.record(2).unwrap().request_amount, 4);
        assert_eq!(store.record(3).unwrap().request_amount, 5);
    }
}

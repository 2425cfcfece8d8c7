use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::{InspectionRecord, Unit};

/// 请领批次明细表 (inspections_request) - 写入一次, 不再变更
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct RequestBatchItem {
    pub inspection_id: i64,
    pub request_order_number: String,
    pub request_amount: i32,
    pub picture_url: String,
    pub item_inspected: String,
    pub unit: Unit,
    pub description: String,
}

impl RequestBatchItem {
    /// 从巡检记录快照生成一条批次明细
    pub fn from_record(record: &InspectionRecord, order_number: &str) -> Self {
        Self {
            inspection_id: record.inspection_id,
            request_order_number: order_number.to_string(),
            request_amount: record.request_amount,
            picture_url: record.picture_url.clone(),
            item_inspected: record.item_inspected.clone(),
            unit: record.unit,
            description: record.description.clone(),
        }
    }
}

/// 生成下一个请领单号: max + 1, 4位补零; 无历史批次从 "0001" 开始。
/// 已存单号解析失败按无历史处理。
pub fn next_order_number(latest: Option<&str>) -> String {
    let max = latest
        .and_then(|number| number.trim().parse::<u32>().ok())
        .unwrap_or(0);
    format!("{:04}", max + 1)
}

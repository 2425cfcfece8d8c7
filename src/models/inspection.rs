use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 计量单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "unit_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Box,
    Pack,
    Roll,
    Piece,
    Pair,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Box => "box",
            Unit::Pack => "pack",
            Unit::Roll => "roll",
            Unit::Piece => "piece",
            Unit::Pair => "pair",
        }
    }
}

/// 存放地点 (固定集合)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "site_location")]
pub enum Location {
    #[sqlx(rename = "Main Office")]
    #[serde(rename = "Main Office")]
    MainOffice,
    Workshop,
    Reception,
    Gym,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::MainOffice => "Main Office",
            Location::Workshop => "Workshop",
            Location::Reception => "Reception",
            Location::Gym => "Gym",
        }
    }
}

/// 巡检人 (已知巡检员名单)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "inspector_name")]
pub enum Inspector {
    #[sqlx(rename = "John Doe")]
    #[serde(rename = "John Doe")]
    JohnDoe,
    #[sqlx(rename = "Jane Smith")]
    #[serde(rename = "Jane Smith")]
    JaneSmith,
    #[sqlx(rename = "Mike Johnson")]
    #[serde(rename = "Mike Johnson")]
    MikeJohnson,
    #[sqlx(rename = "Sarah Lee")]
    #[serde(rename = "Sarah Lee")]
    SarahLee,
}

impl Inspector {
    pub fn as_str(&self) -> &'static str {
        match self {
            Inspector::JohnDoe => "John Doe",
            Inspector::JaneSmith => "Jane Smith",
            Inspector::MikeJohnson => "Mike Johnson",
            Inspector::SarahLee => "Sarah Lee",
        }
    }
}

/// 巡检结论
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "kit_status")]
pub enum KitStatus {
    Passed,
    #[sqlx(rename = "Needs Attention")]
    #[serde(rename = "Needs Attention")]
    NeedsAttention,
    Failed,
}

impl KitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KitStatus::Passed => "Passed",
            KitStatus::NeedsAttention => "Needs Attention",
            KitStatus::Failed => "Failed",
        }
    }
}

/// 巡检记录表 (inspections)
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct InspectionRecord {
    pub inspection_id: i64,
    pub picture_url: String,
    pub item_inspected: String,
    pub item_quantity: i32,
    pub unit: Unit,
    pub expiry_date: NaiveDate,
    pub request_amount: i32, // 待请领数量, 提交后清零
    pub location: Location,
    pub inspection_date: NaiveDate,
    pub inspected_by: Inspector,
    pub kit_condition: String,
    pub next_inspection_date: NaiveDate,
    pub status: KitStatus,
    pub description: String,
}

impl InspectionRecord {
    /// 搜索用字段值列表 - 显式枚举全部 14 个字段, 不做反射式遍历
    pub fn search_haystack(&self) -> [String; 14] {
        [
            self.inspection_id.to_string(),
            self.picture_url.clone(),
            self.item_inspected.clone(),
            self.item_quantity.to_string(),
            self.unit.as_str().to_string(),
            self.expiry_date.to_string(),
            self.request_amount.to_string(),
            self.location.as_str().to_string(),
            self.inspection_date.to_string(),
            self.inspected_by.as_str().to_string(),
            self.kit_condition.clone(),
            self.next_inspection_date.to_string(),
            self.status.as_str().to_string(),
            self.description.clone(),
        ]
    }
}

/// 效期分类 - 只影响展示样式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryStatus {
    Expired,
    Warning,
    Ok,
}

/// 按距效期天数分类: <0 过期, 0..=90 预警, >90 正常
pub fn classify_expiry(expiry_date: NaiveDate, today: NaiveDate) -> ExpiryStatus {
    let days_until_expiry = (expiry_date - today).num_days();
    if days_until_expiry < 0 {
        ExpiryStatus::Expired
    } else if days_until_expiry <= 90 {
        ExpiryStatus::Warning
    } else {
        ExpiryStatus::Ok
    }
}

/// 列表行视图: 记录 + 效期分类
#[derive(Debug, Clone, Serialize)]
pub struct InspectionRow {
    #[serde(flatten)]
    pub record: InspectionRecord,
    pub expiry_status: ExpiryStatus,
}

impl InspectionRow {
    pub fn new(record: InspectionRecord, today: NaiveDate) -> Self {
        let expiry_status = classify_expiry(record.expiry_date, today);
        Self {
            record,
            expiry_status,
        }
    }
}

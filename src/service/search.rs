use crate::models::InspectionRecord;

/// 全字段模糊过滤: 任一字段的字符串值包含小写化查询串即命中。
/// 空查询返回全集; 保持输入顺序; 每次整表重算 (数据量小, 不建索引)。
pub fn filter_records(records: &[InspectionRecord], query: &str) -> Vec<InspectionRecord> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return records.to_vec();
    }

    records
        .iter()
        .filter(|record| {
            record
                .search_haystack()
                .iter()
                .any(|value| value.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Inspector, KitStatus, Location, Unit};
    use chrono::NaiveDate;

    fn record(id: i64, item: &str, location: Location) -> InspectionRecord {
        InspectionRecord {
            inspection_id: id,
            picture_url: format!("https://cdn.example.com/kit{}.jpg", id),
            item_inspected: item.to_string(),
            item_quantity: 10,
            unit: Unit::Box,
            expiry_date: NaiveDate::from_ymd_opt(2027, 6, 1).unwrap(),
            request_amount: 0,
            location,
            inspection_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            inspected_by: Inspector::JohnDoe,
            kit_condition: "Good".to_string(),
            next_inspection_date: NaiveDate::from_ymd_opt(2026, 7, 5).unwrap(),
            status: KitStatus::Passed,
            description: "General stock".to_string(),
        }
    }

    #[test]
    fn empty_query_returns_everything_in_order() {
        let records = vec![
            record(1, "Bandage", Location::Workshop),
            record(2, "Plasters", Location::Gym),
        ];
        let result = filter_records(&records, "");
        assert_eq!(result, records);
    }

    #[test]
    fn match_is_case_insensitive_substring() {
        let records = vec![
            record(1, "Bandage", Location::Workshop),
            record(2, "Plasters", Location::Gym),
        ];
        let result = filter_records(&records, "bAnD");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].inspection_id, 1);
    }

    #[test]
    fn matches_any_field_not_just_name() {
        let records = vec![
            record(1, "Bandage", Location::Workshop),
            record(2, "Plasters", Location::Gym),
            record(3, "Scissors", Location::Workshop),
        ];
        // 地点字段命中
        let by_location = filter_records(&records, "workshop");
        assert_eq!(by_location.len(), 2);
        assert_eq!(by_location[0].inspection_id, 1);
        assert_eq!(by_location[1].inspection_id, 3);
        // 日期字段命中
        let by_date = filter_records(&records, "2027-06");
        assert_eq!(by_date.len(), 3);
    }

    #[test]
    fn result_is_subset_of_input() {
        let records = vec![
            record(1, "Bandage", Location::Workshop),
            record(2, "Plasters", Location::Gym),
        ];
        let result = filter_records(&records, "no-such-value");
        assert!(result.is_empty());
    }
}

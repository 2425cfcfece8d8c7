use crate::models::{InspectionRecord, RequestBatchItem};
use sqlx::PgPool;
use std::path::Path;

/// 新建巡检记录 (ID 由库分配)
pub async fn create_inspection(
    pool: &PgPool,
    record: &InspectionRecord,
) -> Result<InspectionRecord, sqlx::Error> {
    sqlx::query_as::<_, InspectionRecord>(
        r#"
        INSERT INTO inspections (
            picture_url, item_inspected, item_quantity, unit, expiry_date,
            request_amount, location, inspection_date, inspected_by,
            kit_condition, next_inspection_date, status, description
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING inspection_id, picture_url, item_inspected, item_quantity, unit,
                  expiry_date, request_amount, location, inspection_date, inspected_by,
                  kit_condition, next_inspection_date, status, description
        "#,
    )
    .bind(&record.picture_url)
    .bind(&record.item_inspected)
    .bind(record.item_quantity)
    .bind(record.unit)
    .bind(record.expiry_date)
    .bind(record.request_amount)
    .bind(record.location)
    .bind(record.inspection_date)
    .bind(record.inspected_by)
    .bind(&record.kit_condition)
    .bind(record.next_inspection_date)
    .bind(record.status)
    .bind(&record.description)
    .fetch_one(pool)
    .await
}

/// 查询全部巡检记录
pub async fn list_inspections(pool: &PgPool) -> Result<Vec<InspectionRecord>, sqlx::Error> {
    sqlx::query_as::<_, InspectionRecord>(
        r#"
        SELECT inspection_id, picture_url, item_inspected, item_quantity, unit,
               expiry_date, request_amount, location, inspection_date, inspected_by,
               kit_condition, next_inspection_date, status, description
        FROM inspections
        ORDER BY inspection_id
        "#,
    )
    .fetch_all(pool)
    .await
}

/// 全字段更新一条巡检记录
pub async fn update_inspection(
    pool: &PgPool,
    inspection_id: i64,
    record: &InspectionRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE inspections
        SET picture_url = $2,
            item_inspected = $3,
            item_quantity = $4,
            unit = $5,
            expiry_date = $6,
            request_amount = $7,
            location = $8,
            inspection_date = $9,
            inspected_by = $10,
            kit_condition = $11,
            next_inspection_date = $12,
            status = $13,
            description = $14
        WHERE inspection_id = $1
        "#,
    )
    .bind(inspection_id)
    .bind(&record.picture_url)
    .bind(&record.item_inspected)
    .bind(record.item_quantity)
    .bind(record.unit)
    .bind(record.expiry_date)
    .bind(record.request_amount)
    .bind(record.location)
    .bind(record.inspection_date)
    .bind(record.inspected_by)
    .bind(&record.kit_condition)
    .bind(record.next_inspection_date)
    .bind(record.status)
    .bind(&record.description)
    .execute(pool)
    .await
    .map(|_| ())
}

/// 单独更新请领数量 (预览持久化 / 提交后清零共用)
pub async fn update_request_amount(
    pool: &PgPool,
    inspection_id: i64,
    amount: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE inspections
        SET request_amount = $2
        WHERE inspection_id = $1
        "#,
    )
    .bind(inspection_id)
    .bind(amount)
    .execute(pool)
    .await
    .map(|_| ())
}

/// 删除巡检记录
pub async fn delete_inspection(pool: &PgPool, inspection_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        DELETE FROM inspections
        WHERE inspection_id = $1
        "#,
    )
    .bind(inspection_id)
    .execute(pool)
    .await
    .map(|_| ())
}

/// 查询当前最大请领单号 (降序取一)
pub async fn latest_order_number(pool: &PgPool) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        r#"
        SELECT request_order_number
        FROM inspections_request
        ORDER BY request_order_number DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await
}

/// 批量插入请领批次明细
pub async fn insert_request_batch(
    pool: &PgPool,
    rows: &[RequestBatchItem],
) -> Result<(), sqlx::Error> {
    if rows.is_empty() {
        return Ok(());
    }

    tracing::debug!("开始构建批量插入语句, {} 条记录", rows.len());
    let start_time = std::time::Instant::now();

    // 构建批量插入语句
    let mut query_builder = sqlx::QueryBuilder::new(
        "INSERT INTO inspections_request (
            inspection_id, request_order_number, request_amount,
            picture_url, item_inspected, unit, description
        ) ",
    );

    query_builder.push_values(rows, |mut b, row| {
        b.push_bind(row.inspection_id)
            .push_bind(&row.request_order_number)
            .push_bind(row.request_amount)
            .push_bind(&row.picture_url)
            .push_bind(&row.item_inspected)
            .push_bind(row.unit)
            .push_bind(&row.description);
    });

    let build_elapsed = start_time.elapsed();
    tracing::debug!("SQL构建完成, 耗时: {:?}", build_elapsed);

    tracing::debug!("开始执行INSERT操作...");
    let execute_start = std::time::Instant::now();

    // 添加超时控制: 30秒
    let execute_result = tokio::time::timeout(
        std::time::Duration::from_secs(30),
        query_builder.build().execute(pool),
    )
    .await;

    match execute_result {
        Ok(Ok(result)) => {
            let execute_elapsed = execute_start.elapsed();
            tracing::info!(
                "✓ INSERT执行成功, 影响 {} 行, 耗时: {:?}",
                result.rows_affected(),
                execute_elapsed
            );
            Ok(())
        }
        Ok(Err(e)) => {
            let execute_elapsed = execute_start.elapsed();
            tracing::error!("✗ INSERT执行失败, 耗时: {:?}, 错误: {:?}", execute_elapsed, e);
            Err(e)
        }
        Err(_) => {
            tracing::error!("✗ INSERT操作超时 (>30秒)!");
            Err(sqlx::Error::PoolTimedOut)
        }
    }
}

/// 导出请领批次明细到 CSV 文件（PostgreSQL COPY 兼容格式）
pub fn export_requests_to_csv(
    rows: &[RequestBatchItem],
    output_path: &Path,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use csv::Writer;
    use std::fs::File;

    let file = File::create(output_path)?;
    let mut writer = Writer::from_writer(file);

    for row in rows {
        writer.write_record(&[
            row.inspection_id.to_string(),
            row.request_order_number.clone(),
            row.request_amount.to_string(),
            row.picture_url.clone(),
            row.item_inspected.clone(),
            row.unit.as_str().to_string(),
            row.description.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Unit;

    #[test]
    fn csv_export_writes_one_line_per_row() {
        let rows = vec![
            RequestBatchItem {
                inspection_id: 1,
                request_order_number: "0001".to_string(),
                request_amount: 3,
                picture_url: "https://cdn.example.com/kit1.jpg".to_string(),
                item_inspected: "Bandage".to_string(),
                unit: Unit::Roll,
                description: "Sterile gauze roll".to_string(),
            },
            RequestBatchItem {
                inspection_id: 4,
                request_order_number: "0001".to_string(),
                request_amount: 1,
                picture_url: "https://cdn.example.com/kit4.jpg".to_string(),
                item_inspected: "Gloves".to_string(),
                unit: Unit::Pair,
                description: "Nitrile, size M".to_string(),
            },
        ];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request_batch.csv");
        export_requests_to_csv(&rows, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("1,0001,3,"));
        assert!(lines[1].contains("pair"));
    }
}

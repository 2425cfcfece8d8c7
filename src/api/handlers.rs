use crate::models::{InspectionRecord, InspectionRow};
use crate::service::{EditorView, InventoryService, ServiceError};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 通用动作响应
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

/// 列表响应
#[derive(Debug, Serialize)]
pub struct InspectionListResponse {
    pub success: bool,
    pub message: String,
    pub inspections: Vec<InspectionRow>,
}

/// 编辑会话响应
#[derive(Debug, Serialize)]
pub struct EditorResponse {
    pub success: bool,
    pub message: String,
    pub editor: Option<EditorView>,
}

/// Phase 1 预览响应
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub success: bool,
    pub message: String,
    pub request_list: Option<Vec<InspectionRecord>>,
}

/// Phase 2 提交响应
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    pub order_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectBody {
    pub inspection_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct RequestAmountBody {
    pub amount: i32,
}

/// 远端错误 500, 本地拒绝 200 + success=false
fn status_of(error: &ServiceError) -> StatusCode {
    match error {
        ServiceError::Remote(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ServiceError::Rejected(_) => StatusCode::OK,
    }
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 可见行列表 (q 为全字段模糊查询)
pub async fn list_inspections(
    State(service): State<Arc<InventoryService>>,
    Query(params): Query<SearchParams>,
) -> Response {
    let query = params.q.unwrap_or_default();
    let inspections = service.visible(&query).await;
    let response = InspectionListResponse {
        success: true,
        message: format!("{} inspections", inspections.len()),
        inspections,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// 从存储重新加载
pub async fn reload_inspections(State(service): State<Arc<InventoryService>>) -> Response {
    match service.load().await {
        Ok(count) => {
            let response = ActionResponse {
                success: true,
                message: format!("Loaded {} inspections", count),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            let status = status_of(&e);
            let response = ActionResponse {
                success: false,
                message: e.to_string(),
            };
            (status, Json(response)).into_response()
        }
    }
}

/// 行内设置请领数量 (仅本地缓存)
pub async fn set_request_amount(
    State(service): State<Arc<InventoryService>>,
    Path(inspection_id): Path<i64>,
    Json(body): Json<RequestAmountBody>,
) -> Response {
    match service.set_request_amount(inspection_id, body.amount).await {
        Ok(()) => {
            let response = ActionResponse {
                success: true,
                message: format!("Request amount set to {}", body.amount),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            let status = status_of(&e);
            let response = ActionResponse {
                success: false,
                message: e.to_string(),
            };
            (status, Json(response)).into_response()
        }
    }
}

/// 当前编辑会话
pub async fn editor_state(State(service): State<Arc<InventoryService>>) -> Response {
    let editor = service.editor_view().await;
    let response = EditorResponse {
        success: true,
        message: String::new(),
        editor: Some(editor),
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// 选中记录进入编辑会话
pub async fn select_record(
    State(service): State<Arc<InventoryService>>,
    Json(body): Json<SelectBody>,
) -> Response {
    editor_reply(service.select_record(body.inspection_id).await)
}

/// 替换工作副本
pub async fn update_working(
    State(service): State<Arc<InventoryService>>,
    Json(record): Json<InspectionRecord>,
) -> Response {
    editor_reply(service.update_working(record).await)
}

/// 保存编辑
pub async fn save_edit(State(service): State<Arc<InventoryService>>) -> Response {
    match service.save_edit().await {
        Ok(message) => {
            let response = ActionResponse {
                success: true,
                message,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            let status = status_of(&e);
            let response = ActionResponse {
                success: false,
                message: e.to_string(),
            };
            (status, Json(response)).into_response()
        }
    }
}

/// 放弃改动
pub async fn cancel_edit(State(service): State<Arc<InventoryService>>) -> Response {
    editor_reply(service.cancel_edit().await)
}

/// 关闭会话
pub async fn close_edit(State(service): State<Arc<InventoryService>>) -> Response {
    editor_reply(service.close_edit().await)
}

/// Phase 1 - 预览请领单
pub async fn preview_request(State(service): State<Arc<InventoryService>>) -> Response {
    match service.preview_request().await {
        Ok(request_list) => {
            let response = PreviewResponse {
                success: true,
                message: format!("{} items ready for review", request_list.len()),
                request_list: Some(request_list),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            let status = status_of(&e);
            let response = PreviewResponse {
                success: false,
                message: e.to_string(),
                request_list: None,
            };
            (status, Json(response)).into_response()
        }
    }
}

/// Phase 2 - 提交请领单
pub async fn submit_request(State(service): State<Arc<InventoryService>>) -> Response {
    match service.submit_request().await {
        Ok(receipt) => {
            let response = SubmitResponse {
                success: true,
                message: "Request submitted successfully and inventory updated!".to_string(),
                order_number: Some(receipt.order_number),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            let status = status_of(&e);
            let response = SubmitResponse {
                success: false,
                message: e.to_string(),
                order_number: None,
            };
            (status, Json(response)).into_response()
        }
    }
}

fn editor_reply(result: Result<EditorView, ServiceError>) -> Response {
    match result {
        Ok(editor) => {
            let response = EditorResponse {
                success: true,
                message: String::new(),
                editor: Some(editor),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            let status = status_of(&e);
            let response = EditorResponse {
                success: false,
                message: e.to_string(),
                editor: None,
            };
            (status, Json(response)).into_response()
        }
    }
}

use crate::db::store::InventoryStore;
use crate::models::{InspectionRecord, InspectionRow};
use crate::service::compiler::{PreviewOutcome, RequestCompiler, SubmitReceipt};
use crate::service::editor::{EditorState, EditorView, RecordEditor};
use crate::service::search;
use chrono::Local;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// 操作失败分类:
/// Remote - 存储调用失败, 通知串对外, 细节走日志;
/// Rejected - 本地校验/状态拒绝, 未发生任何存储写入。
#[derive(Debug)]
pub enum ServiceError {
    Remote(String),
    Rejected(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Remote(message) | ServiceError::Rejected(message) => {
                f.write_str(message)
            }
        }
    }
}

impl std::error::Error for ServiceError {}

const BUSY_MESSAGE: &str = "Another operation is in flight. Please wait.";

/// 看板本地状态 - 记录缓存按加载顺序保序, 编辑会话与请领候选各一份
#[derive(Default)]
struct DashboardState {
    records: IndexMap<i64, InspectionRecord>,
    editor: RecordEditor,
    candidates: Vec<InspectionRecord>,
    busy: bool, // 存储操作进行中的提示性标志
}

/// 看板应用服务 - 持有存储、记录缓存、编辑会话与请领编译器。
/// 缓存只在对应存储写入成功后变更; 唯一例外是行内的请领数量编辑,
/// 它在 Phase 1 落库前只改本地。
pub struct InventoryService {
    store: Arc<dyn InventoryStore>,
    compiler: RequestCompiler,
    state: Mutex<DashboardState>,
}

impl InventoryService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self {
            compiler: RequestCompiler::new(store.clone()),
            store,
            state: Mutex::new(DashboardState::default()),
        }
    }

    /// 从存储重读全部记录, 替换缓存
    pub async fn load(&self) -> Result<usize, ServiceError> {
        {
            let mut state = self.state.lock().await;
            if state.busy {
                return Err(ServiceError::Rejected(BUSY_MESSAGE.to_string()));
            }
            state.busy = true;
        }

        let result = self.store.list_records().await;

        let mut state = self.state.lock().await;
        state.busy = false;
        match result {
            Ok(records) => {
                state.records = records
                    .into_iter()
                    .map(|record| (record.inspection_id, record))
                    .collect();
                Ok(state.records.len())
            }
            Err(e) => {
                tracing::error!("读取巡检记录失败: {}", e);
                Err(ServiceError::Remote(
                    "Failed to fetch inspections. Please try again.".to_string(),
                ))
            }
        }
    }

    /// 当前可见行: 全字段过滤 + 效期分类
    pub async fn visible(&self, query: &str) -> Vec<InspectionRow> {
        let records: Vec<InspectionRecord> = {
            let state = self.state.lock().await;
            state.records.values().cloned().collect()
        };
        let today = Local::now().date_naive();
        search::filter_records(&records, query)
            .into_iter()
            .map(|record| InspectionRow::new(record, today))
            .collect()
    }

    /// 行内编辑请领数量 - 只改本地缓存, Phase 1 才落库
    pub async fn set_request_amount(&self, inspection_id: i64, amount: i32) -> Result<(), ServiceError> {
        if amount < 0 {
            return Err(ServiceError::Rejected(
                "Request amount must be non-negative.".to_string(),
            ));
        }
        let mut state = self.state.lock().await;
        match state.records.get_mut(&inspection_id) {
            Some(record) => {
                record.request_amount = amount;
                Ok(())
            }
            None => Err(ServiceError::Rejected(format!(
                "Inspection {} not found.",
                inspection_id
            ))),
        }
    }

    pub async fn editor_view(&self) -> EditorView {
        let state = self.state.lock().await;
        EditorView::of(&state.editor)
    }

    /// 选中一条记录开始查看/编辑
    pub async fn select_record(&self, inspection_id: i64) -> Result<EditorView, ServiceError> {
        let mut state = self.state.lock().await;
        let Some(record) = state.records.get(&inspection_id).cloned() else {
            return Err(ServiceError::Rejected(format!(
                "Inspection {} not found.",
                inspection_id
            )));
        };
        state
            .editor
            .select(record)
            .map_err(|denied| ServiceError::Rejected(denied.to_string()))?;
        Ok(EditorView::of(&state.editor))
    }

    /// 替换工作副本, 重算脏标记
    pub async fn update_working(&self, record: InspectionRecord) -> Result<EditorView, ServiceError> {
        let mut state = self.state.lock().await;
        state
            .editor
            .update_working(record)
            .map_err(|denied| ServiceError::Rejected(denied.to_string()))?;
        Ok(EditorView::of(&state.editor))
    }

    /// 保存编辑: 仅 Dirty 可保存; 失败保持 Dirty, 改动不丢
    pub async fn save_edit(&self) -> Result<String, ServiceError> {
        let working = {
            let mut state = self.state.lock().await;
            if state.busy {
                return Err(ServiceError::Rejected(BUSY_MESSAGE.to_string()));
            }
            if state.editor.state() != EditorState::Dirty {
                return Err(ServiceError::Rejected("No unsaved changes.".to_string()));
            }
            let Some(working) = state.editor.working().cloned() else {
                return Err(ServiceError::Rejected("No inspection selected.".to_string()));
            };
            state.busy = true;
            working
        };

        let result = self
            .store
            .update_record(working.inspection_id, &working)
            .await;

        let mut state = self.state.lock().await;
        state.busy = false;
        match result {
            Ok(()) => {
                state.records.insert(working.inspection_id, working);
                state.editor.committed();
                Ok("Changes saved successfully!".to_string())
            }
            Err(e) => {
                tracing::error!("更新巡检记录 {} 失败: {}", working.inspection_id, e);
                Err(ServiceError::Remote(
                    "Error saving changes. Please try again.".to_string(),
                ))
            }
        }
    }

    pub async fn cancel_edit(&self) -> Result<EditorView, ServiceError> {
        let mut state = self.state.lock().await;
        state
            .editor
            .cancel()
            .map_err(|denied| ServiceError::Rejected(denied.to_string()))?;
        Ok(EditorView::of(&state.editor))
    }

    pub async fn close_edit(&self) -> Result<EditorView, ServiceError> {
        let mut state = self.state.lock().await;
        state
            .editor
            .close()
            .map_err(|denied| ServiceError::Rejected(denied.to_string()))?;
        Ok(EditorView::of(&state.editor))
    }

    /// Phase 1 - 预览请领单; 空候选不开复核也不写库
    pub async fn preview_request(&self) -> Result<Vec<InspectionRecord>, ServiceError> {
        let records: Vec<InspectionRecord> = {
            let mut state = self.state.lock().await;
            if state.busy {
                return Err(ServiceError::Rejected(BUSY_MESSAGE.to_string()));
            }
            state.busy = true;
            state.records.values().cloned().collect()
        };

        let result = self.compiler.preview(&records).await;

        let mut state = self.state.lock().await;
        state.busy = false;
        match result {
            Ok(PreviewOutcome::Empty) => {
                state.candidates.clear();
                Err(ServiceError::Rejected(
                    "Request list is empty. Please add items before previewing.".to_string(),
                ))
            }
            Ok(PreviewOutcome::Candidates(candidates)) => {
                state.candidates = candidates.clone();
                Ok(candidates)
            }
            Err(e) => {
                tracing::error!("预览阶段写回请领数量失败: {}", e);
                Err(ServiceError::Remote(
                    "Failed to update request amounts. Please try again.".to_string(),
                ))
            }
        }
    }

    /// Phase 2 - 提交请领单; 成功后清空候选并同步缓存清零
    pub async fn submit_request(&self) -> Result<SubmitReceipt, ServiceError> {
        let candidates: Vec<InspectionRecord> = {
            let mut state = self.state.lock().await;
            if state.busy {
                return Err(ServiceError::Rejected(BUSY_MESSAGE.to_string()));
            }
            if state.candidates.is_empty() {
                return Err(ServiceError::Rejected(
                    "No previewed request to submit.".to_string(),
                ));
            }
            state.busy = true;
            state.candidates.clone()
        };

        let result = self.compiler.submit(&candidates).await;

        let mut state = self.state.lock().await;
        state.busy = false;
        match result {
            Ok(receipt) => {
                for candidate in &candidates {
                    if let Some(record) = state.records.get_mut(&candidate.inspection_id) {
                        record.request_amount = 0;
                    }
                }
                state.candidates.clear();
                Ok(receipt)
            }
            Err(e) => {
                // 清零环节中途失败时已清零的保持清零; 候选保留, 重新提交即恢复
                tracing::error!("提交请领单失败: {}", e);
                Err(ServiceError::Remote(
                    "Failed to submit request or update inventory. Please try again.".to_string(),
                ))
            }
        }
    }
}

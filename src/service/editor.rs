use crate::models::InspectionRecord;
use serde::Serialize;
use std::fmt;

/// 编辑会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EditorState {
    /// 未选中记录
    Idle,
    /// 已选中, 工作副本与原件一致
    Viewing,
    /// 工作副本至少一个字段与原件不同
    Dirty,
}

/// 编辑操作被拒绝的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorDenied {
    NoSelection,
    NotDirty,
    DirtyOpen,
    IdMismatch,
}

impl fmt::Display for EditorDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            EditorDenied::NoSelection => "No inspection selected.",
            EditorDenied::NotDirty => "No unsaved changes.",
            EditorDenied::DirtyOpen => "Unsaved changes present. Save or cancel first.",
            EditorDenied::IdMismatch => "Working copy does not match the selected inspection.",
        };
        f.write_str(message)
    }
}

struct EditSession {
    original: InspectionRecord,
    working: InspectionRecord,
}

/// 单记录编辑器 - 一次跟踪一条记录的原件与工作副本。
/// 脏标记由整条记录的逐字段比较得出, 不比较引用; 日期字段在模型层即为
/// 规范化的 NaiveDate, 比较总是有意义的。
/// 存储调用不在本层: save 由 InventoryService 编排, 成功后调用 committed()。
#[derive(Default)]
pub struct RecordEditor {
    session: Option<EditSession>,
}

impl RecordEditor {
    pub fn new() -> Self {
        Self { session: None }
    }

    pub fn state(&self) -> EditorState {
        match &self.session {
            None => EditorState::Idle,
            Some(session) if session.working == session.original => EditorState::Viewing,
            Some(_) => EditorState::Dirty,
        }
    }

    pub fn working(&self) -> Option<&InspectionRecord> {
        self.session.as_ref().map(|session| &session.working)
    }

    pub fn original(&self) -> Option<&InspectionRecord> {
        self.session.as_ref().map(|session| &session.original)
    }

    /// 选中一条记录进入 Viewing。Dirty 状态下拒绝换行。
    pub fn select(&mut self, record: InspectionRecord) -> Result<(), EditorDenied> {
        if self.state() == EditorState::Dirty {
            return Err(EditorDenied::DirtyOpen);
        }
        self.session = Some(EditSession {
            original: record.clone(),
            working: record,
        });
        Ok(())
    }

    /// 替换工作副本并重算脏标记; 全部字段改回原值即回到 Viewing
    pub fn update_working(&mut self, record: InspectionRecord) -> Result<EditorState, EditorDenied> {
        let Some(session) = self.session.as_mut() else {
            return Err(EditorDenied::NoSelection);
        };
        if record.inspection_id != session.original.inspection_id {
            return Err(EditorDenied::IdMismatch);
        }
        session.working = record;
        Ok(self.state())
    }

    /// 放弃改动, 工作副本回退到原件
    pub fn cancel(&mut self) -> Result<(), EditorDenied> {
        let Some(session) = self.session.as_mut() else {
            return Err(EditorDenied::NoSelection);
        };
        if session.working == session.original {
            return Err(EditorDenied::NotDirty);
        }
        session.working = session.original.clone();
        Ok(())
    }

    /// 关闭会话, 仅允许在 Viewing 下
    pub fn close(&mut self) -> Result<(), EditorDenied> {
        match self.state() {
            EditorState::Viewing => {
                self.session = None;
                Ok(())
            }
            EditorState::Dirty => Err(EditorDenied::DirtyOpen),
            EditorState::Idle => Err(EditorDenied::NoSelection),
        }
    }

    /// 保存成功后由编排方调用, 回到 Idle
    pub fn committed(&mut self) {
        self.session = None;
    }
}

/// 编辑会话对外视图
#[derive(Debug, Clone, Serialize)]
pub struct EditorView {
    pub state: EditorState,
    pub working: Option<InspectionRecord>,
}

impl EditorView {
    pub fn of(editor: &RecordEditor) -> Self {
        Self {
            state: editor.state(),
            working: editor.working().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Inspector, KitStatus, Location, Unit};
    use chrono::NaiveDate;

    fn record(id: i64) -> InspectionRecord {
        InspectionRecord {
            inspection_id: id,
            picture_url: "https://cdn.example.com/kit.jpg".to_string(),
            item_inspected: "Bandage".to_string(),
            item_quantity: 10,
            unit: Unit::Roll,
            expiry_date: NaiveDate::from_ymd_opt(2027, 6, 1).unwrap(),
            request_amount: 0,
            location: Location::Reception,
            inspection_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            inspected_by: Inspector::SarahLee,
            kit_condition: "Good".to_string(),
            next_inspection_date: NaiveDate::from_ymd_opt(2026, 7, 5).unwrap(),
            status: KitStatus::Passed,
            description: "General stock".to_string(),
        }
    }

    #[test]
    fn select_enters_viewing() {
        let mut editor = RecordEditor::new();
        assert_eq!(editor.state(), EditorState::Idle);
        editor.select(record(1)).unwrap();
        assert_eq!(editor.state(), EditorState::Viewing);
    }

    #[test]
    fn edit_then_revert_returns_to_viewing() {
        let mut editor = RecordEditor::new();
        editor.select(record(1)).unwrap();

        let mut edited = record(1);
        edited.item_quantity = 20;
        edited.kit_condition = "Worn".to_string();
        assert_eq!(editor.update_working(edited).unwrap(), EditorState::Dirty);

        // 逐字段改回原值
        assert_eq!(editor.update_working(record(1)).unwrap(), EditorState::Viewing);
    }

    #[test]
    fn cancel_restores_original() {
        let mut editor = RecordEditor::new();
        editor.select(record(1)).unwrap();

        let mut edited = record(1);
        edited.description = "changed".to_string();
        editor.update_working(edited).unwrap();
        assert_eq!(editor.state(), EditorState::Dirty);

        editor.cancel().unwrap();
        assert_eq!(editor.state(), EditorState::Viewing);
        assert_eq!(editor.working().unwrap().description, "General stock");
    }

    #[test]
    fn close_only_from_viewing() {
        let mut editor = RecordEditor::new();
        assert_eq!(editor.close().unwrap_err(), EditorDenied::NoSelection);

        editor.select(record(1)).unwrap();
        let mut edited = record(1);
        edited.item_quantity = 1;
        editor.update_working(edited).unwrap();
        assert_eq!(editor.close().unwrap_err(), EditorDenied::DirtyOpen);

        editor.cancel().unwrap();
        editor.close().unwrap();
        assert_eq!(editor.state(), EditorState::Idle);
    }

    #[test]
    fn select_rejected_while_dirty() {
        let mut editor = RecordEditor::new();
        editor.select(record(1)).unwrap();
        let mut edited = record(1);
        edited.item_quantity = 3;
        editor.update_working(edited).unwrap();
        assert_eq!(editor.select(record(2)).unwrap_err(), EditorDenied::DirtyOpen);
    }

    #[test]
    fn working_id_must_match_selection() {
        let mut editor = RecordEditor::new();
        editor.select(record(1)).unwrap();
        assert_eq!(
            editor.update_working(record(2)).unwrap_err(),
            EditorDenied::IdMismatch
        );
    }

    #[test]
    fn committed_returns_to_idle() {
        let mut editor = RecordEditor::new();
        editor.select(record(1)).unwrap();
        let mut edited = record(1);
        edited.item_quantity = 99;
        editor.update_working(edited).unwrap();
        editor.committed();
        assert_eq!(editor.state(), EditorState::Idle);
    }
}

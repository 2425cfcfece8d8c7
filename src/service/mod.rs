pub mod compiler;
pub mod editor;
pub mod inventory;
pub mod search;

pub use compiler::{select_candidates, PreviewOutcome, RequestCompiler, SubmitReceipt};
pub use editor::{EditorDenied, EditorState, EditorView, RecordEditor};
pub use inventory::{InventoryService, ServiceError};
pub use search::filter_records;

pub mod inspection;
pub mod request;

pub use inspection::{
    classify_expiry, ExpiryStatus, InspectionRecord, InspectionRow, Inspector, KitStatus,
    Location, Unit,
};
pub use request::{next_order_number, RequestBatchItem};

pub mod record_id;

pub use record_id::RecordId;

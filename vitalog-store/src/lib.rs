pub mod repository;
pub mod table;

pub use repository::{
    Error, FileRecordRepository, MockRecordRepository, RecordRepository,
};

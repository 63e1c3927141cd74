#![forbid(unsafe_code)]

pub mod bank;
pub mod repository;
pub mod sqlite;

pub use bank::{QuestionBank, QuestionBankError, QuestionRecord};
pub use repository::{
    InMemoryRepository, ResultRepository, ResultRow, SnapshotRepository, Storage, StorageError,
};

use mongodb::error::Error as MongoError;
use mongodb::error::{ErrorKind, WriteFailure};
use std::result::Result as StdResult;
use thiserror::Error;

/// mongodb server error code for a duplicate key violation.
const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Error, Debug)]
pub enum CloneError {
    #[error("Failed to connect to database {db:?}, connection string: {uri:?}, detailed: {detail:?}")]
    ConnectError {
        uri: String,
        db: String,
        detail: MongoError,
    },
    #[error("Connection string {uri:?} has no trailing database name")]
    MissingDatabaseName { uri: String },
    #[error("Insert into collection {coll:?} failed, the target database probably already contains this document, detailed: {detail:?}")]
    InsertConflict { coll: String, detail: MongoError },
    #[error("Copy stopped after {inserted} of {expected} documents, the source database changed while cloning")]
    Incomplete { inserted: u64, expected: u64 },
    #[error("Mongodb error")]
    MongoError(#[from] MongoError),
}

pub type Result<T> = StdResult<T, CloneError>;

/// Check whether a driver error is a duplicate key violation on the target.
pub(crate) fn is_duplicate_key(err: &MongoError) -> bool {
    match &*err.kind {
        ErrorKind::Write(WriteFailure::WriteError(write_err)) => {
            write_err.code == DUPLICATE_KEY_CODE
        }
        ErrorKind::BulkWrite(failure) => failure
            .write_errors
            .as_ref()
            .map(|errs| errs.iter().any(|e| e.code == DUPLICATE_KEY_CODE))
            .unwrap_or(false),
        _ => false,
    }
}

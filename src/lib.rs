//! Mongo clone lib, which copies every collection of one mongodb database
//! into another instance, with live progress reporting.
//!
//! The clone runs in phases: scan the source to learn the exact amount of
//! work, optionally drop the target, then copy all collections
//! concurrently while a single tracker owns the progress counter.
//!
//! # Example:
//! ```no_run
//! use mongo_clone::{CloneConfig, Connection, MongoCloner};
//!
//! let conf = CloneConfig::new(
//!     "mongodb://localhost:27017/app".to_string(),
//!     "mongodb://localhost:27018/app_copy".to_string(),
//!     false,
//!     None,
//!     None,
//! );
//! let conn = Connection::new(&conf).unwrap();
//! conn.check_access().unwrap();
//! MongoCloner::new(conn).clone_database().unwrap();
//! ```

#![warn(missing_docs)]

#[doc(hidden)]
pub mod cloner;
mod config;
mod connection;
mod error;

/// mongodb metadata collection which must never be counted or copied.
const SYSTEM_INDEXES_COLL: &str = "system.indexes";

pub use cloner::{Inventory, MongoCloner};
pub use config::{db_name_from_url, mask_uri, CloneConfig, CloneFileConfig};
pub use connection::Connection;
pub use error::{CloneError, Result};

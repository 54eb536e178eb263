use crate::config::{db_name_from_url, mask_uri, CloneConfig};
use crate::error::{CloneError, Result};
use mongodb::sync::{Client, Database};

/// A simple abstraction over the two sides of a clone run.
pub struct Connection<'a> {
    source_conn: Client,
    target_conn: Client,
    source_db_name: String,
    target_db_name: String,
    config: &'a CloneConfig,
}

impl<'a> Connection<'a> {
    /// create a new connection pair from given `config`.
    ///
    /// The logical database name of each side is the trailing path segment
    /// of its connection string.
    pub fn new(config: &CloneConfig) -> Result<Connection> {
        let source_db_name = db_name_from_url(config.get_src_url())?;
        let target_db_name = db_name_from_url(config.get_dst_url())?;
        let source_conn = Client::with_uri_str(config.get_src_url()).map_err(|e| {
            CloneError::ConnectError {
                uri: mask_uri(config.get_src_url()),
                db: source_db_name.clone(),
                detail: e,
            }
        })?;
        let target_conn = Client::with_uri_str(config.get_dst_url()).map_err(|e| {
            CloneError::ConnectError {
                uri: mask_uri(config.get_dst_url()),
                db: target_db_name.clone(),
                detail: e,
            }
        })?;
        Ok(Connection {
            source_conn,
            target_conn,
            source_db_name,
            target_db_name,
            config,
        })
    }

    /// Check that both sides are reachable and we are allowed to list
    /// collections on them.
    ///
    /// The driver connects lazily, so this is where bad credentials or an
    /// unreachable host actually surface.
    pub fn check_access(&self) -> Result<()> {
        if let Err(e) = self.get_src_db().list_collection_names(None) {
            return Err(CloneError::ConnectError {
                uri: mask_uri(self.config.get_src_url()),
                db: self.source_db_name.clone(),
                detail: e,
            });
        }
        if let Err(e) = self.get_target_db().list_collection_names(None) {
            return Err(CloneError::ConnectError {
                uri: mask_uri(self.config.get_dst_url()),
                db: self.target_db_name.clone(),
                detail: e,
            });
        }
        Ok(())
    }

    /// get database to clone from.
    pub fn get_src_db(&self) -> Database {
        self.source_conn.database(&self.source_db_name)
    }

    /// get target database to populate.
    pub fn get_target_db(&self) -> Database {
        self.target_conn.database(&self.target_db_name)
    }

    /// logical name of the target database, for operator-facing logs.
    pub fn target_db_name(&self) -> &str {
        &self.target_db_name
    }

    /// get clone configuration.
    pub fn get_conf(&self) -> &CloneConfig {
        self.config
    }
}

use super::full;
use super::progress::{CopyEvent, ProgressTracker};
use super::scanner::{self, Inventory};
use crate::connection::Connection;
use crate::error::Result;
use bson::Document;
use crossbeam::channel;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;
use tracing::info;

/// Clones a whole mongodb database into another instance.
pub struct MongoCloner<'a> {
    manager: CloneManager<'a>,
}

impl<'a> MongoCloner<'a> {
    /// create a new cloner over an established connection pair.
    pub fn new(conn: Connection<'a>) -> MongoCloner<'a> {
        MongoCloner {
            manager: CloneManager::new(conn),
        }
    }

    /// Run the whole clone: scan the source, prepare the target, then copy
    /// every eligible collection concurrently until the document total
    /// computed at scan time is reached.
    pub fn clone_database(&self) -> Result<()> {
        let inventory = self.manager.scan()?;
        self.manager.prepare_target()?;
        if inventory.total_docs == 0 {
            // no increment will ever arrive, don't wait for one.
            info!("Source database holds no documents, nothing to copy.");
            return Ok(());
        }
        self.manager.copy_all(&inventory)
    }
}

struct CloneManager<'a> {
    conn: Connection<'a>,
    pool: ThreadPool,
    doc_pool: Arc<ThreadPool>,
}

impl<'a> CloneManager<'a> {
    pub fn new(conn: Connection<'a>) -> CloneManager<'a> {
        let conf = conn.get_conf();
        let coll_concurrent = conf.get_collection_concurrent();
        let doc_concurrent = conf.get_doc_concurrent();
        CloneManager {
            conn,
            pool: ThreadPoolBuilder::new()
                .num_threads(coll_concurrent)
                .build()
                .unwrap(),
            doc_pool: Arc::new(
                ThreadPoolBuilder::new()
                    .num_threads(doc_concurrent)
                    .build()
                    .unwrap(),
            ),
        }
    }

    /// List and count source collections, before anything is written.
    fn scan(&self) -> Result<Inventory> {
        let inventory = scanner::scan(&self.conn.get_src_db(), &self.pool)?;
        info!(
            collections = inventory.collections.len(),
            total_docs = inventory.total_docs,
            "Scan complete."
        );
        Ok(inventory)
    }

    /// Drop the target database when the force flag is set.
    ///
    /// Must finish before the first copy task launches, otherwise freshly
    /// copied data would be dropped along with the old.
    fn prepare_target(&self) -> Result<()> {
        if self.conn.get_conf().get_force() {
            info!(db = %self.conn.target_db_name(), "Drop target database before cloning.");
            self.conn.get_target_db().drop(None)?;
        }
        Ok(())
    }

    /// Launch one copy task per collection and track progress to the end.
    fn copy_all(&self, inventory: &Inventory) -> Result<()> {
        let doc_concurrent = self.conn.get_conf().get_doc_concurrent();
        let (src_db, target_db) = (self.conn.get_src_db(), self.conn.get_target_db());
        let (sender, receiver) = channel::unbounded();

        for name in &inventory.collections {
            let source_coll = src_db.collection::<Document>(name);
            let target_coll = target_db.collection::<Document>(name);
            let doc_pool = self.doc_pool.clone();
            let events = sender.clone();
            self.pool.spawn(move || {
                if let Err(e) =
                    full::copy_one(source_coll, target_coll, doc_concurrent, doc_pool, &events)
                {
                    let _ = events.send(CopyEvent::Failed(e));
                }
            });
        }
        // workers hold their own clones; keeping this one would make the
        // tracker wait forever on a shrunken source.
        drop(sender);

        let inserted = ProgressTracker::new(inventory.total_docs).track(&receiver)?;
        info!(%inserted, "Copy database complete.");
        Ok(())
    }
}

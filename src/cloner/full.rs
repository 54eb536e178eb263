use super::progress::CopyEvent;
use crate::error::{is_duplicate_key, CloneError, Result};
use bson::Document;
use crossbeam::channel::Sender;
use mongodb::options::FindOptions;
use mongodb::sync::Collection;
use rayon::ThreadPool;
use std::sync::Arc;

/// cursor batch size for the bulk fetch.
const FETCH_BATCH_SIZE: u32 = 10000;

/// Copy one collection from source to target.
///
/// The whole document set is fetched up front, then split across
/// `doc_concurrent` workers on the shared `pool`, each inserting its
/// documents one by one. Every successful insert is reported through
/// `events`; the first failed insert is reported as [CopyEvent::Failed]
/// and its worker stops, sibling workers are abandoned when the process
/// terminates.
pub fn copy_one(
    source_coll: Collection<Document>,
    target_coll: Collection<Document>,
    doc_concurrent: usize,
    pool: Arc<ThreadPool>,
    events: &Sender<CopyEvent>,
) -> Result<()> {
    let cursor = source_coll.find(
        None,
        FindOptions::builder().batch_size(FETCH_BATCH_SIZE).build(),
    )?;
    let mut docs: Vec<Document> = Vec::new();
    for doc in cursor {
        docs.push(doc?);
    }
    if docs.is_empty() {
        return Ok(());
    }

    let name = source_coll.name().to_string();
    let chunk_size = (docs.len() + doc_concurrent - 1) / doc_concurrent;
    for batch in docs.chunks(chunk_size) {
        let batch = batch.to_vec();
        let target_coll = target_coll.clone();
        let name = name.clone();
        let events = events.clone();
        pool.spawn(move || {
            for doc in batch {
                match target_coll.insert_one(doc, None) {
                    Ok(_) => {
                        // the tracker may already be gone, sends are best effort.
                        let _ = events.send(CopyEvent::Inserted { coll: name.clone() });
                    }
                    Err(e) => {
                        let err = if is_duplicate_key(&e) {
                            CloneError::InsertConflict {
                                coll: name.clone(),
                                detail: e,
                            }
                        } else {
                            CloneError::MongoError(e)
                        };
                        let _ = events.send(CopyEvent::Failed(err));
                        return;
                    }
                }
            }
        });
    }
    Ok(())
}

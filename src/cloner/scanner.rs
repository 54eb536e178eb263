use crate::error::Result;
use crate::SYSTEM_INDEXES_COLL;
use bson::Document;
use crossbeam::channel;
use indicatif::{ProgressBar, ProgressDrawTarget};
use mongodb::sync::Database;
use rayon::ThreadPool;

/// Everything the scan phase learned about the source database.
///
/// `total_docs` is computed once, before any copy starts, and is never
/// recomputed afterwards; completion detection depends on it staying fixed.
pub struct Inventory {
    /// eligible collection names, in listing order.
    pub collections: Vec<String>,
    /// sum of the document counts of all eligible collections.
    pub total_docs: u64,
}

/// Take stock of the source database before copying anything.
///
/// Collections are counted concurrently on `pool`; the sum is commutative so
/// completion order does not matter. A transient status line names each
/// collection as its count arrives.
pub fn scan(db: &Database, pool: &ThreadPool) -> Result<Inventory> {
    let names = db.list_collection_names(None)?;
    let collections = eligible_collections(names);

    let spinner = ProgressBar::new_spinner();
    spinner.set_draw_target(ProgressDrawTarget::stdout());
    let (sender, receiver) = channel::bounded(collections.len().max(1));
    for name in &collections {
        let coll = db.collection::<Document>(name);
        let sender = sender.clone();
        let name = name.clone();
        pool.spawn(move || {
            let res = coll.count_documents(None, None).map(|count| (name, count));
            let _ = sender.send(res);
        });
    }
    drop(sender);

    let mut total_docs = 0;
    for res in receiver.iter() {
        let (name, count) = res?;
        spinner.set_message(format!("Fetching: {}", name));
        total_docs += count;
    }
    spinner.finish_with_message("Fetching: DONE");

    Ok(Inventory {
        collections,
        total_docs,
    })
}

/// Filter out mongodb metadata, which must never be counted or copied.
fn eligible_collections(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .filter(|name| name != SYSTEM_INDEXES_COLL)
        .collect()
}

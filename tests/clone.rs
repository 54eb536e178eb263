use bson::{doc, Document};
use mongo_clone::{CloneConfig, CloneError, Connection, MongoCloner, Result};
use mongodb::sync::{Client, Database};

fn source_base() -> &'static str {
    option_env!("CLONE_TEST_SOURCE").unwrap_or("mongodb://localhost:27017")
}

fn target_base() -> &'static str {
    option_env!("CLONE_TEST_TARGET").unwrap_or("mongodb://localhost:27018")
}

struct Context {
    pub(crate) source_db: Database,
    pub(crate) target_db: Database,
}

impl Context {
    fn new(db_name: &str) -> Self {
        let source_db = Client::with_uri_str(source_base()).unwrap().database(db_name);
        let target_db = Client::with_uri_str(target_base()).unwrap().database(db_name);
        // start from a clean slate on both sides.
        source_db.drop(None).unwrap();
        target_db.drop(None).unwrap();
        Self {
            source_db,
            target_db,
        }
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.source_db.drop(None).unwrap();
        self.target_db.drop(None).unwrap();
    }
}

fn run_clone(db_name: &str, force: bool) -> Result<()> {
    let conf = CloneConfig::new(
        format!("{}/{}", source_base(), db_name),
        format!("{}/{}", target_base(), db_name),
        force,
        Some(2),
        Some(2),
    );
    let conn = Connection::new(&conf)?;
    conn.check_access()?;
    MongoCloner::new(conn).clone_database()
}

fn sorted_payloads(db: &Database, coll: &str) -> Vec<Document> {
    let mut docs: Vec<Document> = db
        .collection::<Document>(coll)
        .find(None, None)
        .unwrap()
        .map(|d| d.unwrap())
        .collect();
    docs.sort_by_key(|d| d.get_i32("n").unwrap());
    docs
}

#[test]
#[ignore = "requires running mongodb instances"]
fn test_clone_two_collections() {
    let context = Context::new("clone_test_two_collections");
    let users: Vec<Document> = (0..3).map(|n| doc! {"n": n, "kind": "user"}).collect();
    let orders: Vec<Document> = (0..2).map(|n| doc! {"n": n, "kind": "order"}).collect();
    context
        .source_db
        .collection("users")
        .insert_many(users, None)
        .unwrap();
    context
        .source_db
        .collection("orders")
        .insert_many(orders, None)
        .unwrap();

    run_clone("clone_test_two_collections", false).unwrap();

    assert_eq!(
        context
            .target_db
            .collection::<Document>("users")
            .count_documents(None, None)
            .unwrap(),
        3
    );
    assert_eq!(
        context
            .target_db
            .collection::<Document>("orders")
            .count_documents(None, None)
            .unwrap(),
        2
    );
    // inserted payloads are identical, _id included.
    assert_eq!(
        sorted_payloads(&context.source_db, "users"),
        sorted_payloads(&context.target_db, "users")
    );
    assert_eq!(
        sorted_payloads(&context.source_db, "orders"),
        sorted_payloads(&context.target_db, "orders")
    );
}

#[test]
#[ignore = "requires running mongodb instances"]
fn test_duplicate_key_aborts_run() {
    let context = Context::new("clone_test_duplicate");
    context
        .source_db
        .collection("users")
        .insert_many((0..3).map(|n| doc! {"_id": n, "n": n}), None)
        .unwrap();
    // one colliding _id already lives in the target.
    context
        .target_db
        .collection("users")
        .insert_one(doc! {"_id": 1, "stale": true}, None)
        .unwrap();

    let res = run_clone("clone_test_duplicate", false);
    match res {
        Err(CloneError::InsertConflict { coll, .. }) => assert_eq!(coll, "users"),
        other => panic!("expected InsertConflict, got {:?}", other),
    }
    // the run stopped short of the scanned total.
    assert!(
        context
            .target_db
            .collection::<Document>("users")
            .count_documents(None, None)
            .unwrap()
            < 4
    );
}

#[test]
#[ignore = "requires running mongodb instances"]
fn test_force_drops_target_first() {
    let context = Context::new("clone_test_force");
    context
        .source_db
        .collection("users")
        .insert_many((0..3).map(|n| doc! {"_id": n, "n": n}), None)
        .unwrap();
    // pre-existing target data, including an _id that would otherwise collide.
    context
        .target_db
        .collection("users")
        .insert_one(doc! {"_id": 1, "stale": true}, None)
        .unwrap();
    context
        .target_db
        .collection("leftover")
        .insert_one(doc! {"stale": true}, None)
        .unwrap();

    run_clone("clone_test_force", true).unwrap();

    assert_eq!(
        context
            .target_db
            .collection::<Document>("leftover")
            .count_documents(None, None)
            .unwrap(),
        0
    );
    assert_eq!(
        sorted_payloads(&context.source_db, "users"),
        sorted_payloads(&context.target_db, "users")
    );
}

#[test]
#[ignore = "requires running mongodb instances"]
fn test_empty_source_succeeds_immediately() {
    let _context = Context::new("clone_test_empty");
    run_clone("clone_test_empty", false).unwrap();
}

#[test]
#[ignore = "requires running mongodb instances"]
fn test_bad_credentials_report_connect_error() {
    let res = run_clone_with_source(&format!(
        "mongodb://nosuchuser:wrongpass@{}/clone_test_auth",
        source_base().trim_start_matches("mongodb://")
    ));
    match res {
        Err(CloneError::ConnectError { uri, .. }) => assert!(uri.contains("***")),
        other => panic!("expected ConnectError, got {:?}", other),
    }
}

fn run_clone_with_source(source_url: &str) -> Result<()> {
    let conf = CloneConfig::new(
        source_url.to_string(),
        format!("{}/clone_test_auth", target_base()),
        false,
        Some(2),
        Some(2),
    );
    let conn = Connection::new(&conf)?;
    conn.check_access()?;
    MongoCloner::new(conn).clone_database()
}

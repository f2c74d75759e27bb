use std::thread;
use storefront::{ErrorKind, InitOutcome, ProductFields, SqliteStore, UserFields};
use tempfile::TempDir;

fn fresh_store() -> (TempDir, SqliteStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::new(dir.path().join("database.db"));
    assert!(matches!(store.initialize_store().unwrap(), InitOutcome::Created { .. }));
    (dir, store)
}

#[test]
fn fresh_store_holds_seed_rows() {
    let (_dir, store) = fresh_store();

    let users: Vec<(String, String)> = store
        .list_users()
        .unwrap()
        .into_iter()
        .map(|u| (u.name, u.email))
        .collect();
    assert_eq!(
        users,
        [
            ("Alice".to_string(), "alice@example.com".to_string()),
            ("Bob".to_string(), "bob@example.com".to_string()),
            ("Charlie".to_string(), "charlie@example.com".to_string()),
        ]
    );

    let products: Vec<(String, f64)> = store
        .list_products()
        .unwrap()
        .into_iter()
        .map(|p| (p.name, p.price))
        .collect();
    assert_eq!(
        products,
        [
            ("Laptop".to_string(), 1200.50),
            ("Phone".to_string(), 650.00),
            ("Headphones".to_string(), 85.75),
        ]
    );
}

#[test]
fn initializing_twice_changes_nothing() {
    let (_dir, store) = fresh_store();
    let users_before = store.list_users().unwrap();
    let products_before = store.list_products().unwrap();

    assert_eq!(store.initialize_store().unwrap(), InitOutcome::Existing);

    assert_eq!(store.list_users().unwrap(), users_before);
    assert_eq!(store.list_products().unwrap(), products_before);
}

#[test]
fn duplicate_email_is_a_uniqueness_error() {
    let (_dir, store) = fresh_store();

    let err = store
        .create_user(&UserFields::new("Alice Again", "alice@example.com"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Uniqueness);
    match err {
        storefront::Error::Uniqueness { field, value } => {
            assert_eq!(field, "email");
            assert_eq!(value, "alice@example.com");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.stats().unwrap().users, 3);
}

#[test]
fn created_user_round_trips() {
    let (_dir, store) = fresh_store();

    let id = store.create_user(&UserFields::new("David", "david@example.com")).unwrap();
    let david = store.get_user(id).unwrap().expect("user should exist");
    assert_eq!(david.name, "David");
    assert_eq!(david.email, "david@example.com");
}

#[test]
fn unknown_id_is_not_found() {
    let (_dir, store) = fresh_store();

    assert_eq!(store.get_user(99999).unwrap(), None);
    assert_eq!(store.get_product(99999).unwrap(), None);
}

#[test]
fn deleted_user_is_gone() {
    let (_dir, store) = fresh_store();

    let id = store.create_user(&UserFields::new("Erin", "erin@example.com")).unwrap();
    assert_eq!(store.delete_user(id).unwrap().affected, 1);
    assert!(store.get_user(id).unwrap().is_none());
}

#[test]
fn product_without_price_is_rejected() {
    let (_dir, store) = fresh_store();

    let err = store
        .create_product(&ProductFields {
            name: Some("Tablet".into()),
            price: None,
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(store.list_products().unwrap().len(), 3);
}

#[test]
fn collections_are_independent() {
    let (_dir, store) = fresh_store();

    for user in store.list_users().unwrap() {
        store.delete_user(user.id).unwrap();
    }
    assert!(store.list_users().unwrap().is_empty());
    assert_eq!(store.list_products().unwrap().len(), 3);
}

#[test]
fn concurrent_writers_each_use_their_own_connection() {
    let (_dir, store) = fresh_store();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let store = store.clone();
            thread::spawn(move || {
                store
                    .create_user(&UserFields::new(format!("Worker {i}"), format!("worker{i}@example.com")))
                    .unwrap()
            })
        })
        .collect();

    let mut ids: Vec<i64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4);
    assert_eq!(store.stats().unwrap().users, 7);
}

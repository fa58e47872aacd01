use std::io::Write;
use taxi_database::Database;
use taxi_domain::models::{Car, Driver, Manufacturer};
use taxi_fleet::{FixtureSummary, Fixtures};
use taxi_kernel::security::verify_password;

const DOCUMENT: &str = r#"{
    "manufacturers": [
        { "id": 10, "name": "Tesla", "country": "USA" },
        { "id": 20, "name": "BMW", "country": "Germany" }
    ],
    "drivers": [
        { "id": 1, "username": "anton", "first_name": "Anton", "license_number": "ANT12345", "password": "1qazcde3" },
        { "id": 2, "username": "peter", "license_number": "PET12345" }
    ],
    "cars": [
        { "model": "Model S", "manufacturer": 10, "drivers": [1, 2] },
        { "model": "X5", "manufacturer": 20 }
    ]
}"#;

async fn database() -> Database {
    Database::builder().url("mem://").session("taxi", "fixtures-test").init().await.unwrap()
}

async fn counts(db: &Database) -> (usize, usize, usize) {
    (
        db.table::<Manufacturer>().count().await.unwrap(),
        db.table::<Driver>().count().await.unwrap(),
        db.table::<Car>().count().await.unwrap(),
    )
}

#[tokio::test]
async fn loads_and_links_records() {
    let db = database().await;
    let summary = Fixtures::from_json(DOCUMENT).unwrap().load(&db).await.unwrap();
    assert_eq!(summary, FixtureSummary { manufacturers: 2, drivers: 2, cars: 2 });

    let cars = db.table::<Car>().find_all().await.unwrap();
    let tesla = db.table::<Manufacturer>().try_get(cars[0].manufacturer_id).await.unwrap();
    assert_eq!(tesla.name, "Tesla");
    assert_eq!(cars[0].driver_ids, vec![1, 2]);
    assert!(cars[1].driver_ids.is_empty());
}

#[tokio::test]
async fn passwords_are_hashed() {
    let db = database().await;
    Fixtures::from_json(DOCUMENT).unwrap().load(&db).await.unwrap();

    let drivers = db.table::<Driver>().find_all().await.unwrap();
    let hash = drivers[0].password_hash.as_deref().unwrap();
    assert!(hash.starts_with("$argon2id$"));
    assert!(verify_password("1qazcde3", hash));
    assert_eq!(drivers[1].password_hash, None);
}

#[tokio::test]
async fn dangling_reference_leaves_the_store_empty() {
    let raw = r#"{
        "manufacturers": [{ "id": 1, "name": "Tesla", "country": "USA" }],
        "drivers": [{ "id": 1, "username": "anton", "license_number": "ANT12345" }],
        "cars": [{ "model": "Ghost", "manufacturer": 99 }]
    }"#;
    let db = database().await;
    let err = Fixtures::from_json(raw).unwrap().load(&db).await.unwrap_err();
    assert_eq!(err.kind(), "Fixtures");
    assert!(err.to_string().contains("unknown manufacturer 99"));
    assert_eq!(counts(&db).await, (0, 0, 0));
}

#[tokio::test]
async fn duplicate_document_ids_leave_the_store_empty() {
    let raw = r#"{
        "manufacturers": [
            { "id": 1, "name": "Tesla", "country": "USA" },
            { "id": 1, "name": "BMW", "country": "Germany" }
        ],
        "cars": [{ "model": "X5", "manufacturer": 1 }]
    }"#;
    let db = database().await;
    let err = Fixtures::from_json(raw).unwrap().load(&db).await.unwrap_err();
    assert_eq!(err.kind(), "Fixtures");
    assert!(err.to_string().contains("duplicate manufacturer id 1"));
    assert_eq!(counts(&db).await, (0, 0, 0));

    let raw = r#"{
        "manufacturers": [{ "id": 1, "name": "Tesla", "country": "USA" }],
        "drivers": [
            { "id": 7, "username": "anton", "license_number": "ANT12345" },
            { "id": 7, "username": "peter", "license_number": "PET12345" }
        ]
    }"#;
    let err = Fixtures::from_json(raw).unwrap().load(&db).await.unwrap_err();
    assert!(err.to_string().contains("duplicate driver id 7"));
    assert_eq!(counts(&db).await, (0, 0, 0));
}

#[tokio::test]
async fn duplicate_unique_values_leave_the_store_empty() {
    let raw = r#"{
        "manufacturers": [{ "id": 1, "name": "Tesla", "country": "USA" }],
        "drivers": [
            { "id": 1, "username": "anton", "license_number": "ANT12345" },
            { "id": 2, "username": "anton", "license_number": "ANT54321" }
        ]
    }"#;
    let db = database().await;
    let err = Fixtures::from_json(raw).unwrap().load(&db).await.unwrap_err();
    assert_eq!(err.kind(), "Fixtures");
    assert!(err.to_string().contains(r#"duplicate username "anton""#));
    assert_eq!(counts(&db).await, (0, 0, 0));
}

#[tokio::test]
async fn clash_with_stored_rows_is_a_database_error() {
    let db = database().await;
    let raw = r#"{ "drivers": [{ "id": 1, "username": "anton", "license_number": "ANT12345" }] }"#;
    Fixtures::from_json(raw).unwrap().load(&db).await.unwrap();

    let err = Fixtures::from_json(raw).unwrap().load(&db).await.unwrap_err();
    assert_eq!(err.kind(), "Database");
    assert_eq!(counts(&db).await, (0, 1, 0));
}

#[tokio::test]
async fn reads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(DOCUMENT.as_bytes()).unwrap();

    let summary = Fixtures::from_path(file.path()).unwrap().load(&database().await).await.unwrap();
    assert_eq!(summary.cars, 2);

    let err = Fixtures::from_path(file.path().with_extension("missing")).unwrap_err();
    assert_eq!(err.kind(), "Io");
}

#[test]
fn unknown_fields_are_rejected() {
    let err = Fixtures::from_json(r#"{ "trucks": [] }"#).unwrap_err();
    assert_eq!(err.kind(), "Json");
}

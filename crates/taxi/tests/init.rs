use std::io::Write;
use taxi::domain::config::ApiConfig;
use taxi::domain::models::Driver;
use taxi::features;
use taxi_database::Database;

async fn database() -> Database {
    Database::builder().url("mem://").session("taxi", "facade-test").init().await.unwrap()
}

#[tokio::test]
async fn registers_every_slice() {
    let slices = taxi::init(&ApiConfig::default(), &database().await).await.unwrap();
    let names: Vec<_> = slices.iter().map(|slice| slice.name()).collect();

    assert_eq!(names, features::ENABLED);
    assert!(features::is_enabled("fleet"));
    assert!(!features::is_enabled("billing"));
}

#[tokio::test]
async fn loads_configured_fixtures() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let driver = r#"{ "id": 1, "username": "anton", "license_number": "ANT12345" }"#;
    write!(file, r#"{{ "drivers": [{driver}] }}"#).unwrap();

    let mut config = ApiConfig::default();
    config.database.fixtures = Some(file.path().to_path_buf());
    let db = database().await;

    taxi::init(&config, &db).await.unwrap();
    assert_eq!(db.table::<Driver>().count().await.unwrap(), 1);
}

#[tokio::test]
async fn broken_fixtures_abort_bootstrap() {
    let mut config = ApiConfig::default();
    config.database.fixtures = Some("does/not/exist.json".into());

    let err = taxi::init(&config, &database().await).await.unwrap_err();
    assert_eq!(err.kind(), "Fleet");
    assert!(err.to_string().contains("does/not/exist.json"));
}

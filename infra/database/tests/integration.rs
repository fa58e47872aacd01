use surrealdb::types::SurrealValue;
use taxi_database::{Database, DatabaseError, Lookup, Record, RecordId};

#[derive(Debug, Clone, PartialEq, Eq, SurrealValue)]
struct Manufacturer {
    id: RecordId,
    name: String,
}

impl Manufacturer {
    fn new(name: &str) -> Self {
        Self { id: 0, name: name.to_owned() }
    }
}

impl Record for Manufacturer {
    const TABLE: &'static str = "manufacturer";
    const UNIQUE: &'static [&'static str] = &["name"];

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, SurrealValue)]
struct Car {
    id: RecordId,
    model: String,
    manufacturer_id: RecordId,
    driver_ids: Vec<RecordId>,
}

impl Car {
    fn new(model: impl Into<String>, manufacturer_id: RecordId) -> Self {
        Self { id: 0, model: model.into(), manufacturer_id, driver_ids: Vec::new() }
    }
}

impl Record for Car {
    const TABLE: &'static str = "car";

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

async fn database() -> Database {
    Database::builder().url("mem://").session("taxi", "test").init().await.expect("connect to mem://")
}

#[tokio::test]
async fn connect_in_memory_and_health_check() {
    let db = database().await;
    db.health().await.expect("health check");
    assert_eq!((db.namespace(), db.name()), ("taxi", "test"));
}

#[tokio::test]
async fn missing_parameters_fail_validation() {
    let err = Database::builder().init().await.unwrap_err();
    assert!(matches!(err, DatabaseError::Validation { .. }));

    let err = Database::builder().url("mem://").session("taxi", "  ").init().await.unwrap_err();
    assert_eq!(err.to_string(), "Validation error: Database is required");
}

#[tokio::test]
async fn ids_count_up_per_table() {
    let db = database().await;
    let manufacturers = db.define::<Manufacturer>().await.unwrap();
    let cars = db.define::<Car>().await.unwrap();

    let tesla = manufacturers.insert(Manufacturer::new("Tesla")).await.unwrap();
    let bmw = manufacturers.insert(Manufacturer::new("BMW")).await.unwrap();
    let car = cars.insert(Car::new("Model S", tesla.id)).await.unwrap();

    assert_eq!((tesla.id, bmw.id, car.id), (1, 2, 1));
    assert_eq!(manufacturers.try_get(2).await.unwrap(), bmw);
    assert_eq!(manufacturers.count().await.unwrap(), 2);
}

#[tokio::test]
async fn unique_index_rejects_duplicates() {
    let db = database().await;
    let manufacturers = db.define::<Manufacturer>().await.unwrap();
    manufacturers.insert(Manufacturer::new("Tesla")).await.unwrap();

    let err = manufacturers.insert(Manufacturer::new("Tesla")).await.unwrap_err();
    assert_eq!(err.kind(), "Conflict");
    assert!(err.to_string().contains("manufacturer_name"));
    assert_eq!(manufacturers.count().await.unwrap(), 1);
}

#[tokio::test]
async fn define_is_idempotent() {
    let db = database().await;
    db.define::<Manufacturer>().await.unwrap();
    let manufacturers = db.define::<Manufacturer>().await.unwrap();
    manufacturers.insert(Manufacturer::new("Kia")).await.unwrap();
    assert_eq!(manufacturers.find_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn clones_share_the_store() {
    let db = database().await;
    let clone = db.clone();
    db.define::<Manufacturer>().await.unwrap().insert(Manufacturer::new("Tesla")).await.unwrap();

    assert_eq!(clone.table::<Manufacturer>().count().await.unwrap(), 1);
    assert_eq!(clone.table::<Car>().count().await.unwrap(), 0);
}

#[tokio::test]
async fn concurrent_inserts_get_distinct_ids() {
    let db = database().await;
    let cars = db.define::<Car>().await.unwrap();

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let cars = cars.clone();
            tokio::spawn(async move {
                for n in 0..5 {
                    cars.insert(Car::new(format!("Model {worker}-{n}"), 1)).await.expect("insert car");
                }
            })
        })
        .collect();
    for worker in workers {
        worker.await.expect("worker");
    }

    let ids: Vec<_> = cars.find_all().await.unwrap().iter().map(|c| c.id).collect();
    assert_eq!(ids, (1..=20).collect::<Vec<_>>());
}

#[tokio::test]
async fn lookups_filter_without_writing() {
    let db = database().await;
    let cars = db.define::<Car>().await.unwrap();
    for model in ["Model S", "Model X", "Cybertruck"] {
        cars.insert(Car::new(model, 1)).await.expect("insert");
    }
    let before = cars.find_all().await.unwrap();

    let found = cars.find_where(&Lookup::icontains("model", "MODEL")).await.unwrap();
    let models: Vec<_> = found.iter().map(|c| c.model.as_str()).collect();
    assert_eq!(models, vec!["Model S", "Model X"]);

    assert!(cars.find_one(&Lookup::exact("model", "model s")).await.unwrap().is_none());
    let exact = cars.find_one(&Lookup::exact("model", "Cybertruck")).await.unwrap();
    assert_eq!(exact.map(|c| c.id), Some(3));

    assert_eq!(cars.find_all().await.unwrap(), before);
}

#[tokio::test]
async fn select_orders_by_column_then_id() {
    let db = database().await;
    let manufacturers = db.define::<Manufacturer>().await.unwrap();
    for name in ["Volvo", "Audi", "Kia"] {
        manufacturers.insert(Manufacturer::new(name)).await.unwrap();
    }

    let names: Vec<_> = manufacturers
        .select(None, Some("name"))
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect();
    assert_eq!(names, vec!["Audi", "Kia", "Volvo"]);
}

#[tokio::test]
async fn get_many_skips_unknown_ids() {
    let db = database().await;
    let cars = db.define::<Car>().await.unwrap();
    for model in ["A", "B", "C"] {
        cars.insert(Car::new(model, 1)).await.unwrap();
    }

    let ids: Vec<_> = cars.get_many(&[3, 1, 99]).await.unwrap().iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[tokio::test]
async fn missing_rows() {
    let db = database().await;
    let cars = db.define::<Car>().await.unwrap();

    assert!(cars.get(42).await.unwrap().is_none());
    let err = cars.try_get(42).await.unwrap_err();
    assert_eq!(err.to_string(), "Record not found: car #42");
}

#[tokio::test]
async fn find_referencing_matches_array_members() {
    let db = database().await;
    let cars = db.define::<Car>().await.unwrap();
    for (model, drivers) in [("A", vec![1, 2]), ("B", vec![2]), ("C", vec![3])] {
        cars.insert(Car { driver_ids: drivers, ..Car::new(model, 1) }).await.unwrap();
    }

    let models = |rows: Vec<Car>| rows.into_iter().map(|c| c.model).collect::<Vec<_>>();
    assert_eq!(models(cars.find_referencing("driver_ids", 2).await.unwrap()), vec!["A", "B"]);
    assert!(cars.find_referencing("driver_ids", 9).await.unwrap().is_empty());
}

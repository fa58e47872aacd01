use serde_json::json;
use taxi_domain::models::{Car, Driver, Manufacturer, Record};

#[test]
fn driver_password_hash_is_never_serialized() {
    let driver = Driver::new("anton", "ABC12345").with_password_hash("$argon2id$v=19$salt$digest");

    let value = serde_json::to_value(&driver).expect("serialize driver");
    assert_eq!(value["username"], "anton");
    assert!(value.get("password_hash").is_none());
    assert!(!format!("{driver:?}").contains("digest"));
}

#[test]
fn driver_display_includes_full_name_when_present() {
    assert_eq!(Driver::new("peter", "XYZ00001").to_string(), "peter");
    assert_eq!(
        Driver::new("anton", "ABC12345").with_name("Anton", "Petrov").to_string(),
        "anton (Anton Petrov)"
    );
}

#[test]
fn unique_indexes_cover_identity_columns() {
    assert_eq!(Driver::UNIQUE, ["username", "license_number"]);
    assert_eq!(Manufacturer::UNIQUE, ["name"]);
    assert!(Car::UNIQUE.is_empty());
    assert_eq!((Driver::TABLE, Car::TABLE, Manufacturer::TABLE), ("driver", "car", "manufacturer"));
}

#[test]
fn car_deserializes_without_drivers() {
    let car: Car =
        serde_json::from_value(json!({ "model": "Cybertruck", "manufacturer_id": 1 })).unwrap();
    assert_eq!(car.id, 0);
    assert!(car.driver_ids.is_empty());
}

//! Seed data loaded at startup.
//!
//! The document is JSON with three arrays. Manufacturer and driver ids inside the document only
//! link cars to them; the store assigns its own ids on insert.
//!
//! ```json
//! {
//!   "manufacturers": [{ "id": 1, "name": "Tesla", "country": "USA" }],
//!   "drivers": [{ "id": 1, "username": "anton", "license_number": "ANT12345", "password": "secret" }],
//!   "cars": [{ "model": "Model S", "manufacturer": 1, "drivers": [1] }]
//! }
//! ```

use crate::error::{FleetError, FleetErrorExt};
use fxhash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use std::path::Path;
use taxi_database::Database;
use taxi_domain::models::{Car, Driver, Manufacturer, RecordId};
use taxi_kernel::security::hash_password;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Fixtures {
    manufacturers: Vec<ManufacturerFixture>,
    drivers: Vec<DriverFixture>,
    cars: Vec<CarFixture>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManufacturerFixture {
    id: RecordId,
    name: String,
    country: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DriverFixture {
    id: RecordId,
    username: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    license_number: String,
    /// Plain text; hashed on load.
    #[serde(default)]
    password: Option<String>,
}

impl std::fmt::Debug for DriverFixture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverFixture")
            .field("id", &self.id)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CarFixture {
    model: String,
    manufacturer: RecordId,
    #[serde(default)]
    drivers: Vec<RecordId>,
}

/// What a load inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixtureSummary {
    pub manufacturers: usize,
    pub drivers: usize,
    pub cars: usize,
}

impl Fixtures {
    /// Reads and parses a fixture file.
    ///
    /// # Errors
    /// [`FleetError::Io`] or [`FleetError::Json`] with the path as context.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FleetError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).context(path.display().to_string())?;
        Self::from_json(&raw).context(path.display().to_string())
    }

    /// # Errors
    /// [`FleetError::Json`] if `raw` is not a fixture document.
    pub fn from_json(raw: &str) -> Result<Self, FleetError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Inserts everything into `database`: manufacturers, then drivers, then cars.
    ///
    /// The whole document is checked before the first insert, so a rejected document leaves
    /// the store untouched. Only a clash with rows that were already stored can fail midway.
    ///
    /// # Errors
    /// * [`FleetError::Fixtures`] when a car references an id missing from the document, two
    ///   manufacturers (or two drivers) share a document id, or two entries share a unique
    ///   name, username or license number.
    /// * [`FleetError::Password`] when a fixture password cannot be hashed.
    /// * [`FleetError::Database`] when a row clashes with one already stored.
    pub async fn load(self, database: &Database) -> Result<FixtureSummary, FleetError> {
        let plan = self.plan()?;
        let (manufacturer_table, car_table, driver_table) = crate::define_tables(database).await?;

        let mut manufacturers = FxHashMap::default();
        for (document_id, manufacturer) in plan.manufacturers {
            let stored = manufacturer_table.insert(manufacturer).await.context("manufacturers")?;
            manufacturers.insert(document_id, stored.id);
        }

        let mut drivers = FxHashMap::default();
        for (document_id, driver) in plan.drivers {
            let stored = driver_table.insert(driver).await.context("drivers")?;
            drivers.insert(document_id, stored.id);
        }

        for car in &plan.cars {
            let manufacturer_id = manufacturers[&car.manufacturer];
            let driver_ids: Vec<_> = car.drivers.iter().map(|id| drivers[id]).collect();
            car_table
                .insert(Car::new(car.model.clone(), manufacturer_id).with_drivers(driver_ids))
                .await
                .context("cars")?;
        }

        let summary = FixtureSummary {
            manufacturers: manufacturers.len(),
            drivers: drivers.len(),
            cars: plan.cars.len(),
        };
        info!(
            manufacturers = summary.manufacturers,
            drivers = summary.drivers,
            cars = summary.cars,
            "Fixtures loaded"
        );
        Ok(summary)
    }

    /// Validates the document and builds the rows to insert, hashing passwords on the way.
    fn plan(self) -> Result<Plan, FleetError> {
        let mut ids = FxHashSet::default();
        let mut names = FxHashSet::default();
        let mut manufacturers = Vec::with_capacity(self.manufacturers.len());
        for fixture in self.manufacturers {
            ensure_new(&mut ids, fixture.id, || format!("manufacturer id {}", fixture.id))?;
            ensure_new(&mut names, fixture.name.clone(), || {
                format!("manufacturer name {:?}", fixture.name)
            })?;
            manufacturers.push((fixture.id, Manufacturer::new(fixture.name, fixture.country)));
        }

        let manufacturer_ids = ids;
        let mut ids = FxHashSet::default();
        let mut usernames = FxHashSet::default();
        let mut licenses = FxHashSet::default();
        let mut drivers = Vec::with_capacity(self.drivers.len());
        for fixture in self.drivers {
            ensure_new(&mut ids, fixture.id, || format!("driver id {}", fixture.id))?;
            ensure_new(&mut usernames, fixture.username.clone(), || {
                format!("username {:?}", fixture.username)
            })?;
            ensure_new(&mut licenses, fixture.license_number.clone(), || {
                format!("license number {:?}", fixture.license_number)
            })?;

            let mut driver = Driver::new(fixture.username, fixture.license_number)
                .with_name(fixture.first_name, fixture.last_name);
            if let Some(password) = fixture.password.as_deref() {
                driver = driver.with_password_hash(hash_password(password).context("drivers")?);
            }
            drivers.push((fixture.id, driver));
        }

        for car in &self.cars {
            resolve(&manufacturer_ids, car.manufacturer, "manufacturer", &car.model)?;
            for id in &car.drivers {
                resolve(&ids, *id, "driver", &car.model)?;
            }
        }

        Ok(Plan { manufacturers, drivers, cars: self.cars })
    }
}

/// A validated document, keyed by document ids.
#[derive(Debug)]
struct Plan {
    manufacturers: Vec<(RecordId, Manufacturer)>,
    drivers: Vec<(RecordId, Driver)>,
    cars: Vec<CarFixture>,
}

fn ensure_new<T: Eq + std::hash::Hash>(
    seen: &mut FxHashSet<T>,
    value: T,
    describe: impl FnOnce() -> String,
) -> Result<(), FleetError> {
    if seen.insert(value) {
        return Ok(());
    }
    Err(FleetError::Fixtures { message: format!("duplicate {}", describe()).into(), context: None })
}

fn resolve(
    ids: &FxHashSet<RecordId>,
    id: RecordId,
    kind: &str,
    car: &str,
) -> Result<(), FleetError> {
    if ids.contains(&id) {
        return Ok(());
    }
    Err(FleetError::Fixtures {
        message: format!("car {car:?} references unknown {kind} {id}").into(),
        context: None,
    })
}

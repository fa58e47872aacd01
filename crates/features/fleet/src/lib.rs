//! Fleet feature slice: searchable lists and detail pages for drivers, cars and
//! manufacturers, plus the landing page counters.
//!
//! Every list is the kernel's generic [`ListView`] bound to one search parameter:
//!
//! | List | Parameter | Column |
//! |------|-----------|--------|
//! | drivers | `username` | `Driver.username` |
//! | cars | `model` | `Car.model` |
//! | manufacturers | `name` | `Manufacturer.name` |

mod error;
pub mod fixtures;
#[cfg(feature = "server")]
mod handlers;
#[cfg(feature = "server")]
pub mod router;
pub mod views;

pub use crate::error::{FleetError, FleetErrorExt};
pub use crate::fixtures::{FixtureSummary, Fixtures};

use crate::views::{CarDetailView, CarView, DriverDetailView, DriverView, ManufacturerView};
use fxhash::FxHashMap;
use taxi_database::{Database, DatabaseError, Table};
use taxi_domain::config::ListingConfig;
use taxi_domain::models::{Car, Driver, Manufacturer, RecordId};
use taxi_kernel::domain::registry::InitializedSlice;
use taxi_kernel::listing::{ListPage, ListView};
use taxi_kernel::query::QueryParams;
use tracing::info;

/// Fleet feature state
#[taxi_derive::taxi_slice(name = "fleet")]
pub struct Fleet {
    manufacturers: Table<Manufacturer>,
    cars: Table<Car>,
    drivers: Table<Driver>,
    driver_list: ListView<Driver>,
    car_list: ListView<Car>,
    manufacturer_list: ListView<Manufacturer>,
}

/// Row counts shown on the landing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FleetCounts {
    pub drivers: usize,
    pub cars: usize,
    pub manufacturers: usize,
}

impl Fleet {
    /// Drivers searched by `username`.
    ///
    /// # Errors
    /// [`FleetError::InvalidPage`] for a `page` parameter outside the result.
    pub async fn drivers(&self, query: &QueryParams) -> Result<ListPage<DriverView>, FleetError> {
        Ok(self.driver_list.render(&self.drivers, query).await?.map(DriverView::from))
    }

    /// Cars searched by `model`, each with its manufacturer.
    ///
    /// # Errors
    /// [`FleetError::InvalidPage`] for a `page` parameter outside the result.
    pub async fn cars(&self, query: &QueryParams) -> Result<ListPage<CarView>, FleetError> {
        let page = self.car_list.render(&self.cars, query).await?;
        let manufacturers = self.manufacturers_by_id(page.object_list()).await?;
        Ok(page.map(|car| {
            let manufacturer = manufacturers.get(&car.manufacturer_id).cloned();
            CarView::new(car, manufacturer)
        }))
    }

    /// Manufacturers searched by `name`, ordered by name.
    ///
    /// # Errors
    /// [`FleetError::InvalidPage`] for a `page` parameter outside the result.
    pub async fn manufacturers(
        &self,
        query: &QueryParams,
    ) -> Result<ListPage<ManufacturerView>, FleetError> {
        let page = self.manufacturer_list.render(&self.manufacturers, query).await?;
        Ok(page.map(ManufacturerView::from))
    }

    /// # Errors
    /// [`FleetError::Database`] if a count query fails.
    pub async fn counts(&self) -> Result<FleetCounts, FleetError> {
        Ok(FleetCounts {
            drivers: self.drivers.count().await?,
            cars: self.cars.count().await?,
            manufacturers: self.manufacturers.count().await?,
        })
    }

    /// A driver and the cars assigned to them.
    ///
    /// # Errors
    /// [`FleetError::NotFound`] if there is no such driver.
    pub async fn driver_detail(&self, id: RecordId) -> Result<DriverDetailView, FleetError> {
        let driver = self.drivers.try_get(id).await.map_err(not_found)?;
        let assigned = self.cars.find_referencing("driver_ids", id).await?;
        let manufacturers = self.manufacturers_by_id(&assigned).await?;
        let cars = assigned
            .into_iter()
            .map(|car| {
                let manufacturer = manufacturers.get(&car.manufacturer_id).cloned();
                CarView::new(car, manufacturer)
            })
            .collect();

        Ok(DriverDetailView {
            id: driver.id,
            username: driver.username,
            first_name: driver.first_name,
            last_name: driver.last_name,
            license_number: driver.license_number,
            cars,
        })
    }

    /// A car with its manufacturer and assigned drivers.
    ///
    /// # Errors
    /// [`FleetError::NotFound`] if there is no such car.
    pub async fn car_detail(&self, id: RecordId) -> Result<CarDetailView, FleetError> {
        let car = self.cars.try_get(id).await.map_err(not_found)?;
        let manufacturer =
            self.manufacturers.get(car.manufacturer_id).await?.map(ManufacturerView::from);
        let drivers = self
            .drivers
            .get_many(&car.driver_ids)
            .await?
            .into_iter()
            .map(DriverView::from)
            .collect();

        Ok(CarDetailView { id: car.id, model: car.model, manufacturer, drivers })
    }

    async fn manufacturers_by_id(
        &self,
        cars: &[Car],
    ) -> Result<FxHashMap<RecordId, Manufacturer>, FleetError> {
        let mut ids: Vec<_> = cars.iter().map(|car| car.manufacturer_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let manufacturers = self.manufacturers.get_many(&ids).await?;
        Ok(manufacturers.into_iter().map(|m| (m.id, m)).collect())
    }
}

fn not_found(err: DatabaseError) -> FleetError {
    match err {
        DatabaseError::NotFound { message, context } => FleetError::NotFound { message, context },
        other => other.into(),
    }
}

/// Defines the fleet tables and their unique indexes. Safe to call more than once.
///
/// # Errors
/// [`FleetError::Database`] if a definition is rejected.
pub async fn define_tables(
    database: &Database,
) -> Result<(Table<Manufacturer>, Table<Car>, Table<Driver>), FleetError> {
    let manufacturers = database.define::<Manufacturer>().await.context("Fleet tables")?;
    let cars = database.define::<Car>().await.context("Fleet tables")?;
    let drivers = database.define::<Driver>().await.context("Fleet tables")?;
    Ok((manufacturers, cars, drivers))
}

/// Initialize the fleet feature.
///
/// # Errors
/// [`FleetError::Database`] if the tables cannot be defined.
pub async fn init(
    listing: &ListingConfig,
    database: &Database,
) -> Result<InitializedSlice, FleetError> {
    let page_size = listing.page_size;
    let (manufacturers, cars, drivers) = define_tables(database).await?;

    let inner = FleetInner {
        manufacturers,
        cars,
        drivers,
        driver_list: ListView::new("username", "username")
            .context_object_name("driver_list")
            .page_size(page_size),
        car_list: ListView::new("model", "model")
            .context_object_name("car_list")
            .page_size(page_size),
        manufacturer_list: ListView::new("name", "name")
            .context_object_name("manufacturer_list")
            .ordering("name")
            .page_size(page_size),
    };

    info!(slice = Fleet::NAME, page_size, "Fleet slice initialized");
    Ok(InitializedSlice::new(Fleet::new(inner)))
}

//! Response shapes. Records are never serialized directly so the password hash and raw
//! foreign keys stay out of the API.

use taxi_derive::api_model;
use taxi_domain::models::{Car, Driver, Manufacturer};

#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct ManufacturerView {
    pub id: u64,
    pub name: String,
    pub country: String,
}

impl From<Manufacturer> for ManufacturerView {
    fn from(manufacturer: Manufacturer) -> Self {
        Self { id: manufacturer.id, name: manufacturer.name, country: manufacturer.country }
    }
}

#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct DriverView {
    pub id: u64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
}

impl From<Driver> for DriverView {
    fn from(driver: Driver) -> Self {
        Self {
            id: driver.id,
            username: driver.username,
            first_name: driver.first_name,
            last_name: driver.last_name,
            license_number: driver.license_number,
        }
    }
}

#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct CarView {
    pub id: u64,
    pub model: String,
    /// `None` only if the manufacturer row is gone.
    pub manufacturer: Option<ManufacturerView>,
}

impl CarView {
    pub(crate) fn new(car: Car, manufacturer: Option<Manufacturer>) -> Self {
        Self { id: car.id, model: car.model, manufacturer: manufacturer.map(Into::into) }
    }
}

/// Landing page counters.
#[api_model]
pub struct IndexView {
    pub num_drivers: usize,
    pub num_cars: usize,
    pub num_manufacturers: usize,
    /// Index hits in the current session, this one included.
    pub num_visits: u64,
}

#[api_model]
pub struct DriverDetailView {
    pub id: u64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
    /// Cars the driver is assigned to.
    pub cars: Vec<CarView>,
}

#[api_model]
pub struct CarDetailView {
    pub id: u64,
    pub model: String,
    pub manufacturer: Option<ManufacturerView>,
    pub drivers: Vec<DriverView>,
}

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display};
use surrealdb_types::SurrealValue;

pub use taxi_database::{Record, RecordId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SurrealValue)]
pub struct Manufacturer {
    #[serde(default)]
    pub id: RecordId,
    pub name: String,
    pub country: String,
}

impl Manufacturer {
    pub fn new(name: impl Into<String>, country: impl Into<String>) -> Self {
        Self { id: 0, name: name.into(), country: country.into() }
    }
}

impl Display for Manufacturer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.country)
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

/// A car belongs to exactly one manufacturer and may be assigned to several drivers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SurrealValue)]
pub struct Car {
    #[serde(default)]
    pub id: RecordId,
    pub model: String,
    pub manufacturer_id: RecordId,
    #[serde(default)]
    pub driver_ids: Vec<RecordId>,
}

impl Car {
    pub fn new(model: impl Into<String>, manufacturer_id: RecordId) -> Self {
        Self { id: 0, model: model.into(), manufacturer_id, driver_ids: Vec::new() }
    }

    #[must_use]
    pub fn with_drivers(mut self, driver_ids: impl IntoIterator<Item = RecordId>) -> Self {
        self.driver_ids = driver_ids.into_iter().collect();
        self
    }
}

impl Display for Car {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.model)
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

/// A driver is also the login account: `username` is the login identity.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, SurrealValue)]
pub struct Driver {
    #[serde(default)]
    pub id: RecordId,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub license_number: String,
    #[serde(default, skip_serializing)]
    pub password_hash: Option<String>,
}

impl Driver {
    pub fn new(username: impl Into<String>, license_number: impl Into<String>) -> Self {
        Self {
            id: 0,
            username: username.into(),
            first_name: String::new(),
            last_name: String::new(),
            license_number: license_number.into(),
            password_hash: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    #[must_use]
    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = Some(hash.into());
        self
    }

    /// `first last`, trimmed; empty when neither is set.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_owned()
    }
}

// Hand-written so the password hash never reaches logs.
impl Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("license_number", &self.license_number)
            .field("password_hash", &self.password_hash.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full_name = self.full_name();
        if full_name.is_empty() {
            f.write_str(&self.username)
        } else {
            write!(f, "{} ({full_name})", self.username)
        }
    }
}

impl Record for Driver {
    const TABLE: &'static str = "driver";
    const UNIQUE: &'static [&'static str] = &["username", "license_number"];

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

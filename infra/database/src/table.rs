use crate::Database;
use crate::error::{DatabaseError, DatabaseErrorExt};
use crate::record::{Record, RecordId};
use std::fmt;
use std::marker::PhantomData;
use tracing::trace;

// Every read projects the integer key back into `id`.
const PROJECTION: &str = "*, id.id() AS id";

/// A single-column `WHERE` clause. The compared value is always bound, never inlined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Case-sensitive equality.
    Exact { column: &'static str, value: String },
    /// Case-insensitive substring match.
    IContains { column: &'static str, needle: String },
}

impl Lookup {
    pub fn exact(column: &'static str, value: impl Into<String>) -> Self {
        Self::Exact { column, value: value.into() }
    }

    pub fn icontains(column: &'static str, needle: impl Into<String>) -> Self {
        Self::IContains { column, needle: needle.into() }
    }

    #[must_use]
    pub const fn column(&self) -> &'static str {
        match self {
            Self::Exact { column, .. } | Self::IContains { column, .. } => column,
        }
    }

    fn value(&self) -> String {
        match self {
            Self::Exact { value, .. } => value.clone(),
            Self::IContains { needle, .. } => needle.clone(),
        }
    }

    /// The `WHERE` condition, reading its operand from `$value`.
    #[must_use]
    pub fn condition(&self) -> String {
        match self {
            Self::Exact { column, .. } => format!("{column} = $value"),
            Self::IContains { column, .. } => {
                format!("string::lowercase({column}) CONTAINS string::lowercase($value)")
            }
        }
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact { column, value } => write!(f, "{column} = {value:?}"),
            Self::IContains { column, needle } => write!(f, "{column} ICONTAINS {needle:?}"),
        }
    }
}

/// Typed handle to one table.
///
/// Results come back in primary-key order unless a query names another column.
pub struct Table<T> {
    database: Database,
    marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Table<T> {
    fn clone(&self) -> Self {
        Self { database: self.database.clone(), marker: PhantomData }
    }
}

impl<T: Record> fmt::Debug for Table<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table").field("name", &T::TABLE).finish()
    }
}

impl<T: Record> Table<T> {
    pub(crate) const fn new(database: Database) -> Self {
        Self { database, marker: PhantomData }
    }

    /// Stores `record` under the next free id and returns the stored copy.
    ///
    /// # Errors
    /// * [`DatabaseError::Conflict`] if a `UNIQUE` column already holds one of the values.
    /// * [`DatabaseError::Surreal`] for any other engine failure.
    pub async fn insert(&self, mut record: T) -> Result<T, DatabaseError> {
        let _writer = self.database.writer().await;

        let id = self
            .database
            .query(format!(
                "RETURN (math::max((SELECT VALUE id.id() FROM {})) ?? 0) + 1",
                T::TABLE
            ))
            .await
            .context("Allocating id")?
            .take::<Option<RecordId>>(0)
            .context("Allocating id")?
            .unwrap_or(1);
        record.set_id(id);

        self.database
            .query(format!("INSERT INTO {} $record", T::TABLE))
            .bind(("record", record.clone()))
            .await
            .and_then(|response| response.check().map_err(surrealdb::Error::from))
            .map_err(|err| DatabaseError::from_write(err, format!("Inserting into {}", T::TABLE)))?;

        trace!(table = T::TABLE, id, "Record inserted");
        Ok(record)
    }

    /// # Errors
    /// [`DatabaseError::Surreal`] if the query fails.
    pub async fn get(&self, id: RecordId) -> Result<Option<T>, DatabaseError> {
        let record = self
            .database
            .query(format!("SELECT {PROJECTION} FROM ONLY {}:{id}", T::TABLE))
            .await
            .context(T::TABLE)?
            .take::<Option<T>>(0)
            .context(T::TABLE)?;
        Ok(record)
    }

    /// Like [`Table::get`] but missing rows are an error.
    ///
    /// # Errors
    /// Returns [`DatabaseError::NotFound`] if no row has this id.
    pub async fn try_get(&self, id: RecordId) -> Result<T, DatabaseError> {
        self.get(id).await?.ok_or_else(|| DatabaseError::NotFound {
            message: format!("{} #{id}", T::TABLE).into(),
            context: None,
        })
    }

    /// Rows with the given ids, in primary-key order. Unknown ids are skipped.
    ///
    /// # Errors
    /// [`DatabaseError::Surreal`] if the query fails.
    pub async fn get_many(&self, ids: &[RecordId]) -> Result<Vec<T>, DatabaseError> {
        let rows = self
            .database
            .query(format!(
                "SELECT {PROJECTION} FROM {} WHERE id.id() IN $ids ORDER BY id",
                T::TABLE
            ))
            .bind(("ids", ids.to_vec()))
            .await
            .context(T::TABLE)?
            .take::<Vec<T>>(0)
            .context(T::TABLE)?;
        Ok(rows)
    }

    /// Every row, in primary-key order.
    ///
    /// # Errors
    /// [`DatabaseError::Surreal`] if the query fails.
    pub async fn find_all(&self) -> Result<Vec<T>, DatabaseError> {
        self.select(None, None).await
    }

    /// Rows matching `lookup`, in primary-key order.
    ///
    /// # Errors
    /// [`DatabaseError::Surreal`] if the query fails.
    pub async fn find_where(&self, lookup: &Lookup) -> Result<Vec<T>, DatabaseError> {
        self.select(Some(lookup), None).await
    }

    /// The first row (by primary key) matching `lookup`.
    ///
    /// # Errors
    /// [`DatabaseError::Surreal`] if the query fails.
    pub async fn find_one(&self, lookup: &Lookup) -> Result<Option<T>, DatabaseError> {
        let row = self
            .database
            .query(format!(
                "SELECT {PROJECTION} FROM {} WHERE {} ORDER BY id LIMIT 1",
                T::TABLE,
                lookup.condition()
            ))
            .bind(("value", lookup.value()))
            .await
            .context(T::TABLE)?
            .take::<Vec<T>>(0)
            .context(T::TABLE)?
            .into_iter()
            .next();
        Ok(row)
    }

    /// Rows whose array `column` holds `id`, in primary-key order.
    ///
    /// # Errors
    /// [`DatabaseError::Surreal`] if the query fails.
    pub async fn find_referencing(
        &self,
        column: &'static str,
        id: RecordId,
    ) -> Result<Vec<T>, DatabaseError> {
        let rows = self
            .database
            .query(format!(
                "SELECT {PROJECTION} FROM {} WHERE $id IN {column} ORDER BY id",
                T::TABLE
            ))
            .bind(("id", id))
            .await
            .context(T::TABLE)?
            .take::<Vec<T>>(0)
            .context(T::TABLE)?;
        Ok(rows)
    }

    /// Rows matching `lookup` (all rows without one), ordered by `order_by` and then by id.
    ///
    /// # Errors
    /// [`DatabaseError::Surreal`] if the query fails.
    pub async fn select(
        &self,
        lookup: Option<&Lookup>,
        order_by: Option<&'static str>,
    ) -> Result<Vec<T>, DatabaseError> {
        let condition =
            lookup.map(|lookup| format!(" WHERE {}", lookup.condition())).unwrap_or_default();
        let order = order_by
            .filter(|column| *column != "id")
            .map_or_else(|| "id".to_owned(), |column| format!("{column}, id"));
        let statement =
            format!("SELECT {PROJECTION} FROM {}{condition} ORDER BY {order}", T::TABLE);
        trace!(table = T::TABLE, %statement, "Selecting rows");

        let mut query = self.database.query(statement);
        if let Some(lookup) = lookup {
            query = query.bind(("value", lookup.value()));
        }
        let rows = query.await.context(T::TABLE)?.take::<Vec<T>>(0).context(T::TABLE)?;
        Ok(rows)
    }

    /// # Errors
    /// [`DatabaseError::Surreal`] if the query fails.
    pub async fn count(&self) -> Result<usize, DatabaseError> {
        let count = self
            .database
            .query(format!("RETURN array::len((SELECT VALUE id FROM {}))", T::TABLE))
            .await
            .context(T::TABLE)?
            .take::<Option<u64>>(0)
            .context(T::TABLE)?
            .unwrap_or_default();

        usize::try_from(count).map_err(|_| DatabaseError::Internal {
            message: format!("{} row count {count} does not fit usize", T::TABLE).into(),
            context: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icontains_lowercases_both_sides() {
        let lookup = Lookup::icontains("username", "AN");
        assert_eq!(
            lookup.condition(),
            "string::lowercase(username) CONTAINS string::lowercase($value)"
        );
        assert_eq!(lookup.value(), "AN");
    }

    #[test]
    fn exact_lookup_compares_the_bound_value() {
        let lookup = Lookup::exact("username", "peter");
        assert_eq!(lookup.condition(), "username = $value");
        assert_eq!(lookup.column(), "username");
    }

    #[test]
    fn display_names_the_column() {
        assert_eq!(Lookup::icontains("model", "Model").to_string(), "model ICONTAINS \"Model\"");
        assert_eq!(Lookup::exact("name", "Kia").to_string(), "name = \"Kia\"");
    }
}

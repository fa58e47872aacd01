//! Generic searchable, paginated list view.
//!
//! One [`ListView`] is configured per record type with the query parameter it reads, the
//! column that parameter filters (case-insensitive substring) and an optional ordering column.
//! Rendering only reads: the filter runs as a `SELECT` and nothing is written back.

use crate::pagination::{Page, PaginationError, PaginationErrorExt, Paginator};
use crate::query::{QueryOverrides, QueryParams, query_transform};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use taxi_database::{DatabaseError, Lookup, Record, Table};
use taxi_derive::api_model;
use taxi_domain::constants::PAGE_PARAM;
use tracing::debug;

#[taxi_derive::taxi_error]
pub enum ListingError {
    /// The `page` parameter does not name an existing page.
    #[error("{source}{}", format_context(.context))]
    InvalidPage { source: PaginationError, context: Option<Cow<'static, str>> },

    #[error("List query failed{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },
}

pub struct ListView<T> {
    search_param: &'static str,
    context_object_name: Cow<'static, str>,
    column: &'static str,
    order_by: Option<&'static str>,
    paginator: Paginator,
    marker: PhantomData<fn() -> T>,
}

impl<T: Record> ListView<T> {
    /// A view searching `column` with the `search_param` query parameter.
    /// The list is exposed as `<table>_list` until renamed.
    pub fn new(search_param: &'static str, column: &'static str) -> Self {
        Self {
            search_param,
            context_object_name: Cow::Owned(format!("{}_list", T::TABLE)),
            column,
            order_by: None,
            paginator: Paginator::default(),
            marker: PhantomData,
        }
    }

    #[must_use]
    pub fn context_object_name(mut self, name: &'static str) -> Self {
        self.context_object_name = Cow::Borrowed(name);
        self
    }

    /// Without an ordering rows come in primary-key order. Ties fall back to the key.
    #[must_use]
    pub fn ordering(mut self, column: &'static str) -> Self {
        self.order_by = Some(column);
        self
    }

    #[must_use]
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.paginator = Paginator::new(page_size);
        self
    }

    #[must_use]
    pub const fn search_param(&self) -> &'static str {
        self.search_param
    }

    /// The active search term. Absent and empty both mean "no filter".
    #[must_use]
    pub fn search_term<'q>(&self, query: &'q QueryParams) -> Option<&'q str> {
        query.get(self.search_param).filter(|term| !term.is_empty())
    }

    /// Every row, or those whose column contains `term` ignoring case, in view order.
    ///
    /// # Errors
    /// [`DatabaseError`] if the `SELECT` fails.
    pub async fn filter(
        &self,
        table: &Table<T>,
        term: Option<&str>,
    ) -> Result<Vec<T>, DatabaseError> {
        let lookup = term.map(|term| Lookup::icontains(self.column, term));
        table.select(lookup.as_ref(), self.order_by).await
    }

    /// Filters, orders and paginates `table` for the given request query.
    ///
    /// # Errors
    /// * [`ListingError::InvalidPage`] if the `page` parameter does not name an existing page.
    /// * [`ListingError::Database`] if the `SELECT` fails.
    pub async fn render(
        &self,
        table: &Table<T>,
        query: &QueryParams,
    ) -> Result<ListPage<T>, ListingError> {
        let term = self.search_term(query);
        let rows = self.filter(table, term).await?;
        debug!(table = T::TABLE, search = ?term, rows = rows.len(), "Rendering list");

        let page = PaginationErrorExt::context(
            self.paginator.paginate(rows, query.get(PAGE_PARAM)),
            format!("{} list", T::TABLE),
        )?;
        let link =
            |number: usize| query_transform(query, &QueryOverrides::new().set(PAGE_PARAM, number));

        Ok(ListPage {
            context_object_name: self.context_object_name.clone(),
            search: term.unwrap_or_default().to_owned(),
            next_query: page.next_page_number().map(link),
            previous_query: page.previous_page_number().map(link),
            page,
        })
    }
}

impl<T> Clone for ListView<T> {
    fn clone(&self) -> Self {
        Self {
            search_param: self.search_param,
            context_object_name: self.context_object_name.clone(),
            column: self.column,
            order_by: self.order_by,
            paginator: self.paginator,
            marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ListView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListView")
            .field("search_param", &self.search_param)
            .field("context_object_name", &self.context_object_name)
            .field("column", &self.column)
            .field("order_by", &self.order_by)
            .field("page_size", &self.paginator.page_size())
            .finish()
    }
}

/// Pagination block of a list response.
#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub number: usize,
    pub num_pages: usize,
    pub count: usize,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: Option<usize>,
    pub previous_page_number: Option<usize>,
    /// Query string (no `?`) of the next page with every other parameter kept.
    pub next_query: Option<String>,
    pub previous_query: Option<String>,
}

/// A rendered list page.
///
/// Serializes as `{ "<context_object_name>": [..], "search", "is_paginated", "page_obj" }`.
#[derive(Debug, Clone)]
pub struct ListPage<T> {
    context_object_name: Cow<'static, str>,
    pub search: String,
    pub page: Page<T>,
    pub next_query: Option<String>,
    pub previous_query: Option<String>,
}

impl<T> ListPage<T> {
    #[must_use]
    pub fn context_object_name(&self) -> &str {
        &self.context_object_name
    }

    #[must_use]
    pub fn object_list(&self) -> &[T] {
        &self.page.object_list
    }

    #[must_use]
    pub const fn is_paginated(&self) -> bool {
        self.page.num_pages > 1
    }

    #[must_use]
    pub fn page_info(&self) -> PageInfo {
        PageInfo {
            number: self.page.number,
            num_pages: self.page.num_pages,
            count: self.page.count,
            has_next: self.page.has_next(),
            has_previous: self.page.has_previous(),
            next_page_number: self.page.next_page_number(),
            previous_page_number: self.page.previous_page_number(),
            next_query: self.next_query.clone(),
            previous_query: self.previous_query.clone(),
        }
    }

    /// Converts the rows (e.g. records into response views) keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ListPage<U> {
        ListPage {
            context_object_name: self.context_object_name,
            search: self.search,
            page: self.page.map(f),
            next_query: self.next_query,
            previous_query: self.previous_query,
        }
    }
}

impl<T: Serialize> Serialize for ListPage<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry(self.context_object_name(), self.object_list())?;
        map.serialize_entry("search", &self.search)?;
        map.serialize_entry("is_paginated", &self.is_paginated())?;
        map.serialize_entry("page_obj", &self.page_info())?;
        map.end()
    }
}

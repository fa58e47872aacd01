//! Ordered query-string parameters and the link-building transform used by paginated views.
//!
//! [`query_transform`] takes the current request's parameters plus a set of overrides and
//! renders the query string for a link: the page links of a filtered list keep the active
//! search term and only swap `page`.

use std::fmt;
use url::form_urlencoded;

/// Query parameters in request order. A key may occur several times.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Parses a raw (still percent-encoded) query string. A leading `?` is ignored.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        Self { pairs: form_urlencoded::parse(raw.as_bytes()).into_owned().collect() }
    }

    /// The last value given for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs.iter().filter(move |(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Replaces every value of `key` with `value`.
    ///
    /// The key keeps the position of its first occurrence; a new key goes last.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(first) => {
                self.pairs[first].1 = value;
                let mut index = 0;
                self.pairs.retain(|(k, _)| {
                    let keep = index == first || k != key;
                    index += 1;
                    keep
                });
            }
            None => self.pairs.push((key.to_owned(), value)),
        }
    }

    /// Drops every occurrence of `key`. Returns whether anything was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.pairs.len();
        self.pairs.retain(|(k, _)| k != key);
        before != self.pairs.len()
    }

    /// A copy with `overrides` applied in order. `self` is left untouched.
    #[must_use]
    pub fn transform(&self, overrides: &QueryOverrides) -> Self {
        let mut params = self.clone();
        for (key, value) in &overrides.entries {
            match value {
                Some(value) => params.set(key, value.as_str()),
                None => {
                    params.remove(key);
                }
            }
        }
        params
    }

    /// Form-urlencoded rendering without a leading `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new()).extend_pairs(self.pairs.iter()).finish()
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

impl From<&str> for QueryParams {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

/// Keyword overrides for [`query_transform`]. `None` removes the key.
#[must_use]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOverrides {
    entries: Vec<(String, Option<String>)>,
}

impl QueryOverrides {
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn set(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.entries.push((key.into(), Some(value.to_string())));
        self
    }

    pub fn remove(mut self, key: impl Into<String>) -> Self {
        self.entries.push((key.into(), None));
        self
    }

    /// `Some` sets, `None` removes.
    pub fn with<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.entries.push((key.into(), value.map(|v| v.to_string())));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, Option<V>)> for QueryOverrides
where
    K: Into<String>,
    V: ToString,
{
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), |overrides, (key, value)| overrides.with(key, value))
    }
}

/// Renders `current` with `overrides` applied, ready to be put after a `?`.
///
/// Keys not mentioned in `overrides` keep their values and order. An override to `None`
/// removes the key entirely; an override of an existing key keeps its position.
#[must_use]
pub fn query_transform(current: &QueryParams, overrides: &QueryOverrides) -> String {
    current.transform(overrides).to_query_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_order_and_duplicates() {
        let params = QueryParams::parse("?a=1&b=2&a=3");
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2"), ("a", "3")]);
        assert_eq!(params.get("a"), Some("3"));
        assert_eq!(params.get_all("a").collect::<Vec<_>>(), vec!["1", "3"]);
    }

    #[test]
    fn parse_decodes_plus_and_percent() {
        let params = QueryParams::parse("model=Model+S&name=Land%20Rover");
        assert_eq!(params.get("model"), Some("Model S"));
        assert_eq!(params.get("name"), Some("Land Rover"));
    }

    #[test]
    fn set_collapses_duplicates_at_first_position() {
        let mut params = QueryParams::parse("a=1&b=2&a=3&c=4");
        params.set("a", "9");
        assert_eq!(params.to_query_string(), "a=9&b=2&c=4");
    }

    #[test]
    fn remove_reports_whether_anything_changed() {
        let mut params = QueryParams::parse("a=1&b=2&a=3");
        assert!(params.remove("a"));
        assert!(!params.remove("a"));
        assert_eq!(params.to_query_string(), "b=2");
    }

    #[test]
    fn overrides_apply_in_order() {
        let overrides = QueryOverrides::new().set("page", 2).remove("page").set("page", 3);
        let link = query_transform(&QueryParams::new(), &overrides);
        assert_eq!(link, "page=3");
    }

    #[test]
    fn overrides_from_iterator() {
        let overrides: QueryOverrides = [("page", Some(4)), ("search", None)].into_iter().collect();
        let link = query_transform(&QueryParams::parse("search=x&page=1"), &overrides);
        assert_eq!(link, "page=4");
    }
}

use proptest::prelude::*;
use taxi_kernel::query::{QueryOverrides, QueryParams, query_transform};

fn pairs(rendered: &str) -> Vec<(String, String)> {
    QueryParams::parse(rendered).iter().map(|(k, v)| (k.to_owned(), v.to_owned())).collect()
}

#[test]
fn adding_a_key_keeps_existing_ones() {
    let link = query_transform(&QueryParams::parse("?page=1"), &QueryOverrides::new().set("search", "john"));
    assert_eq!(link, "page=1&search=john");
}

#[test]
fn overriding_replaces_the_value() {
    let link = query_transform(&QueryParams::parse("?page=1"), &QueryOverrides::new().set("page", 2));
    assert_eq!(link, "page=2");
}

#[test]
fn null_override_removes_the_key() {
    let link = query_transform(
        &QueryParams::parse("?page=1&search=test"),
        &QueryOverrides::new().remove("search"),
    );
    assert_eq!(link, "page=1");
}

#[test]
fn mixed_overrides() {
    let link = query_transform(
        &QueryParams::parse("?page=3&filter=active"),
        &QueryOverrides::new().remove("page").set("sort", "name"),
    );
    assert!(link.contains("filter=active"));
    assert!(link.contains("sort=name"));
    assert!(!link.contains("page="));
    assert_eq!(link, "filter=active&sort=name");
}

#[test]
fn empty_result_is_empty_string() {
    let link = query_transform(&QueryParams::parse("?page=1"), &QueryOverrides::new().remove("page"));
    assert_eq!(link, "");
    assert_eq!(query_transform(&QueryParams::new(), &QueryOverrides::new()), "");
}

#[test]
fn input_is_not_mutated() {
    let current = QueryParams::parse("page=1&search=test");
    let before = current.clone();
    let _ = query_transform(&current, &QueryOverrides::new().set("page", 2).remove("search"));
    assert_eq!(current, before);
}

#[test]
fn values_are_form_encoded() {
    let link = query_transform(&QueryParams::new(), &QueryOverrides::new().set("model", "Model S&X"));
    assert_eq!(link, "model=Model+S%26X");
    assert_eq!(QueryParams::parse(&link).get("model"), Some("Model S&X"));
}

fn key() -> impl Strategy<Value = String> {
    "[a-e]{1,3}"
}

fn value() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 &=?%+]{0,8}"
}

fn query() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec((key(), value()), 0..6)
}

fn overrides() -> impl Strategy<Value = Vec<(String, Option<String>)>> {
    prop::collection::vec((key(), prop::option::of(value())), 0..4)
}

proptest! {
    #[test]
    fn untouched_keys_keep_values_and_order(query in query(), overrides in overrides()) {
        let current: QueryParams = query.iter().cloned().collect();
        let rendered = query_transform(&current, &overrides.iter().cloned().collect());

        let touched = |k: &str| overrides.iter().any(|(key, _)| key == k);
        let expected: Vec<_> = query.iter().filter(|(k, _)| !touched(k)).cloned().collect();
        let kept: Vec<_> = pairs(&rendered).into_iter().filter(|(k, _)| !touched(k)).collect();
        prop_assert_eq!(kept, expected);
    }

    #[test]
    fn final_override_decides_each_key(query in query(), overrides in overrides()) {
        let current: QueryParams = query.iter().cloned().collect();
        let rendered = pairs(&query_transform(&current, &overrides.iter().cloned().collect()));

        for (key, _) in &overrides {
            let last = overrides.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v.clone());
            let found: Vec<_> = rendered.iter().filter(|(k, _)| k == key).map(|(_, v)| v.clone()).collect();
            match last.flatten() {
                None => prop_assert!(found.is_empty()),
                Some(value) => prop_assert_eq!(found, vec![value]),
            }
        }
    }

    #[test]
    fn reserializing_is_a_no_op(query in query(), overrides in overrides()) {
        let current: QueryParams = query.into_iter().collect();
        let rendered = query_transform(&current, &overrides.into_iter().collect());
        prop_assert_eq!(query_transform(&QueryParams::parse(&rendered), &QueryOverrides::new()), rendered);
    }
}

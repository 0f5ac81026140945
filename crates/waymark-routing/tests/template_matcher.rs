//! Integration tests for matching request paths against templates.
//!
//! Tests cover: simple and multi-part segments, optional and catch-all
//! parameters, defaults, case-insensitivity, and sharing a matcher between
//! threads.

use std::sync::Arc;
use std::thread;

use waymark_routing::matcher::{match_path, TemplateMatcher};
use waymark_routing::template::ParsedTemplate;
use waymark_routing::value::{RouteValue, RouteValueMap};

fn matcher(template: &str, defaults: &[(&str, &str)]) -> TemplateMatcher {
    let template = Arc::new(ParsedTemplate::parse(template).unwrap());
    TemplateMatcher::new(template, defaults.iter().copied().collect())
}

fn values(pairs: &[(&str, &str)]) -> RouteValueMap {
    pairs.iter().copied().collect()
}

// ═════════════════════════════════════════════════════════════════════
// 1. Simple segments
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_all_parameters_supplied() {
    let m = matcher("{controller}/{action}/{id?}", &[]);
    assert_eq!(
        m.matches("Products/Details/5"),
        Some(values(&[
            ("controller", "Products"),
            ("action", "Details"),
            ("id", "5")
        ]))
    );
}

#[test]
fn test_optional_parameter_omitted() {
    let m = matcher("{controller}/{action}/{id?}", &[]);
    let result = m.matches("Products/Index").unwrap();
    assert_eq!(result, values(&[("controller", "Products"), ("action", "Index")]));
    assert!(!result.contains_key("id"));
}

#[test]
fn test_required_parameter_without_default_fails() {
    let m = matcher("{controller}/{action}", &[]);
    assert!(m.matches("Products").is_none());
}

#[test]
fn test_defaults_fill_missing_segments() {
    let m = matcher("{controller}/{action}/{id}", &[("action", "Index"), ("id", "0")]);
    assert_eq!(
        m.matches("Home"),
        Some(values(&[("controller", "Home"), ("action", "Index"), ("id", "0")]))
    );
}

#[test]
fn test_defaults_for_non_parameters_are_included() {
    let m = matcher("{controller}", &[("area", "admin")]);
    assert_eq!(
        m.matches("Users"),
        Some(values(&[("controller", "Users"), ("area", "admin")]))
    );
}

#[test]
fn test_captured_value_beats_default() {
    let m = matcher("{controller}/{action}", &[("action", "Index")]);
    let result = m.matches("Home/About").unwrap();
    assert_eq!(result.get("action"), Some(&RouteValue::from("About")));
}

#[test]
fn test_too_many_segments_fails() {
    let m = matcher("{controller}/{action}", &[]);
    assert!(m.matches("a/b/c").is_none());
}

#[test]
fn test_trailing_slash_is_tolerated() {
    let m = matcher("{controller}/{action}", &[]);
    assert!(m.matches("Home/Index/").is_some());
}

#[test]
fn test_literals_ignore_case_and_values_keep_it() {
    let m = matcher("Admin/{section}", &[]);
    let result = m.matches("aDMIN/Users").unwrap();
    assert_eq!(result.get("section"), Some(&RouteValue::from("Users")));
    assert!(m.matches("Adm/Users").is_none());
}

#[test]
fn test_values_are_not_decoded() {
    let m = matcher("{name}", &[]);
    assert_eq!(m.matches("a%20b"), Some(values(&[("name", "a%20b")])));
}

#[test]
fn test_empty_template_matches_empty_path() {
    let m = matcher("", &[]);
    assert_eq!(m.matches(""), Some(RouteValueMap::new()));
    assert!(m.matches("x").is_none());
}

// ═════════════════════════════════════════════════════════════════════
// 2. Catch-all parameters
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_catch_all_takes_remainder() {
    let m = matcher("{*slug}", &[]);
    assert_eq!(m.matches("a/b/c"), Some(values(&[("slug", "a/b/c")])));
}

#[test]
fn test_catch_all_after_literal() {
    let m = matcher("files/{*path}", &[]);
    assert_eq!(
        m.matches("files/docs/2024/report.pdf"),
        Some(values(&[("path", "docs/2024/report.pdf")]))
    );
}

#[test]
fn test_empty_catch_all_is_null_or_default() {
    let m = matcher("files/{*path}", &[]);
    let result = m.matches("files").unwrap();
    assert_eq!(result.get("path"), Some(&RouteValue::Null));

    let m = matcher("files/{*path}", &[("path", "index")]);
    assert_eq!(m.matches("files/").unwrap().get("path"), Some(&RouteValue::from("index")));
}

// ═════════════════════════════════════════════════════════════════════
// 3. Multi-part segments
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_year_month() {
    let m = matcher("Sales/{year}-{month}", &[]);
    assert_eq!(
        m.matches("Sales/2023-04"),
        Some(values(&[("year", "2023"), ("month", "04")]))
    );
    assert!(m.matches("Sales/2023").is_none());
}

#[test]
fn test_literal_suffix() {
    let m = matcher("{controller}.mvc/{action}", &[]);
    assert_eq!(
        m.matches("home.MVC/index"),
        Some(values(&[("controller", "home"), ("action", "index")]))
    );
    assert!(m.matches(".mvc/index").is_none());
}

#[test]
fn test_repeated_literal_backtracks() {
    let m = matcher("{p1}.{p2}.{p3}", &[]);
    assert_eq!(
        m.matches("a.b.c.d"),
        Some(values(&[("p1", "a.b"), ("p2", "c"), ("p3", "d")]))
    );
}

#[test]
fn test_optional_format() {
    let m = matcher("{controller}/{action}.{format?}", &[("action", "Index")]);
    let result = m.matches("Home/Create.xml").unwrap();
    assert_eq!(result.get("format"), Some(&RouteValue::from("xml")));
    assert_eq!(result.len(), 3);

    let result = m.matches("Home/Create").unwrap();
    assert_eq!(result.len(), 2);
    assert!(!result.contains_key("format"));

    assert!(m.matches("Home/Create.").is_none());
}

#[test]
fn test_optional_format_default() {
    let m = matcher(
        "{controller}/{action}.{format?}",
        &[("action", "Index"), ("format", "xml")],
    );
    let result = m.matches("Home/Create").unwrap();
    assert_eq!(result.get("format"), Some(&RouteValue::from("xml")));
}

#[test]
fn test_failed_segment_leaves_no_values() {
    let template = ParsedTemplate::parse("{a}-{b}/{c}").unwrap();
    assert!(match_path(&template, "x/y", &RouteValueMap::new()).is_none());
}

// ═════════════════════════════════════════════════════════════════════
// 4. Determinism and sharing
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_matching_is_deterministic() {
    let m = matcher("{a}-{b}-{c}", &[]);
    let first = m.matches("1-2-3-4-5");
    for _ in 0..10 {
        assert_eq!(m.matches("1-2-3-4-5"), first);
    }
    assert_eq!(first, Some(values(&[("a", "1-2-3"), ("b", "4"), ("c", "5")])));
}

#[test]
fn test_shared_template_across_threads() {
    let template = Arc::new(ParsedTemplate::parse("users/{id}/posts/{slug}").unwrap());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let template = Arc::clone(&template);
            thread::spawn(move || {
                let path = format!("users/{i}/posts/post-{i}");
                match_path(&template, &path, &RouteValueMap::new())
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle.join().unwrap().unwrap();
        assert_eq!(result.get("id"), Some(&RouteValue::from(i.to_string())));
        assert_eq!(result.get("slug"), Some(&RouteValue::from(format!("post-{i}"))));
    }
}

mod common;

use chrono::NaiveDate;
use common::{check, date_time, fails, local, Target};
use sift::QueryError;

fn assert_cases(target: &Target, field: &str, cases: &[(&str, &str, bool)]) {
    for (op, literal, expected) in cases {
        let query = format!("{field} {op} {literal}");
        assert_eq!(check(&query, target), *expected, "query: {query}");
    }
}

fn assert_failures(target: &Target, field: &str, queries: &[&str]) {
    for rest in queries {
        let query = format!("{field} {rest}");
        assert!(fails(&query, target), "expected evaluation error: {query}");
    }
}

#[test]
fn test_date_field() {
    let target = Target::new();
    assert_eq!(target.date_value, NaiveDate::from_ymd_opt(2021, 2, 5).unwrap());

    assert_cases(
        &target,
        "dateValue",
        &[
            ("=", "2021-02-05", true),
            ("=", "2021-10-06", false),
            ("!=", "2021-02-05", false),
            ("!=", "2021-10-06", true),
            (">", "2021-02-04", true),
            (">", "2021-02-05", false),
            (">=", "2021-02-05", true),
            (">=", "2021-02-06", false),
            ("<", "2021-02-06", true),
            ("<", "2021-02-05", false),
            ("<=", "2021-02-05", true),
            ("<=", "2021-02-04", false),
            ("∈", "[2021-02-04, 2021-02-05, 2021-02-06]", true),
            ("∈", "[2021-02-05]", true),
            ("∈", "[2021-02-04]", false),
        ],
    );

    assert_failures(
        &target,
        "dateValue",
        &[
            "= X",
            "> X",
            "= 2021-02-05T10:15",
            "≈ 2021-02-05",
            "!≈ 2021-02-06",
            "∈ X",
        ],
    );
}

#[test]
fn test_date_time_with_minutes() {
    let mut target = Target::new();
    target.date_time_value = date_time(2021, 2, 5, 10, 15, 0, 0);

    assert_cases(
        &target,
        "dateTimeValue",
        &[
            ("=", "2021-02-05T10:15", true),
            ("=", "2021-02-05T10:15:00", true),
            ("=", "2021-02-05T10:16", false),
            ("!=", "2021-10-05T10:14", true),
            (">", "2021-02-05T10:14", true),
            (">", "2021-02-05T10:15", false),
            (">=", "2021-02-05T10:15", true),
            ("<", "2021-02-05T10:16", true),
            ("<=", "2021-02-05T10:14", false),
            ("∈", "[2021-02-05T10:14, 2021-02-05T10:15]", true),
            ("∈", "[2021-02-05T10:14]", false),
        ],
    );

    assert_failures(&target, "dateTimeValue", &["= X", "≈ 2021-02-05T10:15", "∈ X"]);
}

#[test]
fn test_date_time_with_seconds() {
    let mut target = Target::new();
    target.date_time_value = date_time(2021, 2, 5, 10, 15, 16, 0);

    assert_cases(
        &target,
        "dateTimeValue",
        &[
            ("=", "2021-02-05T10:15:16", true),
            ("=", "2021-02-05T10:15:15", false),
            (">", "2021-02-05T10:15:15", true),
            (">=", "2021-02-05T10:15:17", false),
            ("<", "2021-02-05T10:15:17", true),
            ("<=", "2021-02-05T10:15:16", true),
            ("∈", "[2021-02-05T10:15:15, 2021-02-05T10:15:16]", true),
        ],
    );
}

#[test]
fn test_date_time_fraction_is_decimal() {
    let mut target = Target::new();
    target.date_time_value = date_time(2021, 2, 5, 10, 15, 16, 170);

    assert_cases(
        &target,
        "dateTimeValue",
        &[
            ("=", "2021-02-05T10:15:16.17", true),
            ("=", "2021-02-05T10:15:16.170", true),
            ("=", "2021-02-05T10:15:16.18", false),
            ("!=", "2021-10-05T10:15:16.16", true),
            (">", "2021-02-05T10:15:16.16", true),
            (">", "2021-02-05T10:15:16.17", false),
            ("<=", "2021-02-05T10:15:16.18", true),
            ("∈", "[2021-02-05T10:15:16.16, 2021-02-05T10:15:16.17]", true),
            ("∈", "[2021-02-05T10:15:16.16]", false),
        ],
    );
}

#[test]
fn test_date_time_date_only_is_midnight() {
    let target = Target::new();
    assert!(check("dateTimeValue = 2021-02-05", &target));
    assert!(check("dateTimeValue < 2021-02-05T00:00:00.000000001", &target));
}

#[test]
fn test_timestamp_field() {
    let mut target = Target::new();
    target.timestamp_value = local(date_time(2021, 2, 5, 10, 15, 16, 0));

    assert_cases(
        &target,
        "timestampValue",
        &[
            ("=", "2021-02-05T10:15:16", true),
            ("=", "2021-02-05T10:15:15", false),
            (">", "2021-02-05T10:15", true),
            (">=", "2021-02-05T10:15:16", true),
            ("<", "2021-02-05T10:15:17", true),
            ("<=", "2021-02-05", false),
            ("∈", "[2021-02-05T10:15:15, 2021-02-05T10:15:16]", true),
        ],
    );

    assert_failures(
        &target,
        "timestampValue",
        &["= X", "< X", "≈ 2021-02-05T10:15:16", "!≈ 2021-02-05", "∈ X"],
    );
}

#[test]
fn test_timestamp_fraction_is_millisecond_count() {
    let mut target = Target::new();
    target.timestamp_value = local(date_time(2021, 2, 5, 10, 15, 16, 17));

    assert_cases(
        &target,
        "timestampValue",
        &[
            ("=", "2021-02-05T10:15:16.17", true),
            ("=", "2021-02-05T10:15:16.017", true),
            ("=", "2021-02-05T10:15:16.170", false),
            ("=", "2021-02-05T10:15:16.18", false),
            (">", "2021-02-05T10:15:16.16", true),
            ("<", "2021-02-05T10:15:16.18", true),
            ("∈", "[2021-02-05T10:15:16.16, 2021-02-05T10:15:16.17]", true),
            ("∈", "[2021-02-05T10:15:16.16]", false),
        ],
    );
}

#[test]
fn test_matches_on_date_time_is_unsupported() {
    let target = Target::new();
    let err = common::parse("dateTimeValue ≈ 2021*").test(&target).unwrap_err();
    assert!(matches!(
        err,
        QueryError::UnsupportedOperator {
            kind: "date-time",
            ..
        }
    ));
}

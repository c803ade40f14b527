#![allow(dead_code)]

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use sift::{FieldAccessor, LiteralCoercer, Query, QueryParser, Registry};

/// Record with one field per supported kind
#[derive(Debug, Clone)]
pub struct Target {
    pub boolean_value: bool,
    pub byte_value: i8,
    pub char_value: char,
    pub short_value: i16,
    pub int_value: i32,
    pub long_value: i64,
    pub float_value: f32,
    pub double_value: f64,
    pub string_value: String,
    pub date_value: NaiveDate,
    pub date_time_value: NaiveDateTime,
    pub timestamp_value: DateTime<Local>,
}

impl Target {
    pub fn new() -> Self {
        let date = NaiveDate::from_ymd_opt(2021, 2, 5).unwrap();
        let midnight = date.and_hms_opt(0, 0, 0).unwrap();
        Self {
            boolean_value: false,
            byte_value: 0,
            char_value: 'a',
            short_value: 0,
            int_value: 0,
            long_value: 0,
            float_value: 0.0,
            double_value: 0.0,
            string_value: String::new(),
            date_value: date,
            date_time_value: midnight,
            timestamp_value: local(midnight),
        }
    }
}

pub fn local(naive: NaiveDateTime) -> DateTime<Local> {
    Local.from_local_datetime(&naive).earliest().unwrap()
}

pub fn date_time(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32, milli: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_milli_opt(h, min, s, milli)
        .unwrap()
}

pub fn registry() -> Registry<Target> {
    Registry::builder()
        .accessor(FieldAccessor::boolean("booleanValue", |t: &Target| t.boolean_value))
        .accessor(FieldAccessor::byte("byteValue", |t: &Target| t.byte_value))
        .accessor(FieldAccessor::char("charValue", |t: &Target| t.char_value))
        .accessor(FieldAccessor::short("shortValue", |t: &Target| t.short_value))
        .accessor(FieldAccessor::int("intValue", |t: &Target| t.int_value))
        .accessor(FieldAccessor::long("longValue", |t: &Target| t.long_value))
        .accessor(FieldAccessor::float("floatValue", |t: &Target| t.float_value))
        .accessor(FieldAccessor::double("doubleValue", |t: &Target| t.double_value))
        .accessor(FieldAccessor::text("stringValue", |t: &Target| {
            t.string_value.as_str()
        }))
        .accessor(FieldAccessor::date("dateValue", |t: &Target| t.date_value))
        .accessor(FieldAccessor::date_time("dateTimeValue", |t: &Target| {
            t.date_time_value
        }))
        .accessor(FieldAccessor::timestamp("timestampValue", |t: &Target| {
            t.timestamp_value
        }))
        .coercer(LiteralCoercer::boolean("booleanValue"))
        .coercer(LiteralCoercer::byte("byteValue"))
        .coercer(LiteralCoercer::char("charValue"))
        .coercer(LiteralCoercer::short("shortValue"))
        .coercer(LiteralCoercer::int("intValue"))
        .coercer(LiteralCoercer::long("longValue"))
        .coercer(LiteralCoercer::float("floatValue"))
        .coercer(LiteralCoercer::double("doubleValue"))
        .coercer(LiteralCoercer::date("dateValue"))
        .coercer(LiteralCoercer::date_time("dateTimeValue"))
        .coercer(LiteralCoercer::timestamp("timestampValue"))
        .build()
}

pub fn parser() -> QueryParser<Target> {
    QueryParser::new(registry())
}

pub fn parse(query: &str) -> Query<Target> {
    parser()
        .parse(query)
        .unwrap_or_else(|e| panic!("failed to parse {query:?}: {e}"))
}

/// Parse, then evaluate against `target`; panics on evaluation errors
pub fn check(query: &str, target: &Target) -> bool {
    parse(query)
        .test(target)
        .unwrap_or_else(|e| panic!("failed to evaluate {query:?}: {e}"))
}

/// True when parsing succeeds and evaluation fails
pub fn fails(query: &str, target: &Target) -> bool {
    parse(query).test(target).is_err()
}

//! # Value Synthesizer
//!
//! Stateless type-to-literal generation: given a column's declared type
//! and size limit, produce a plausible value for it. Foreign-key columns
//! only reach this code after resolution has come up empty.

use std::borrow::Cow;

use chrono::{Duration as ChronoDuration, NaiveTime, Utc};
use fake::faker::lorem::en::*;
use fake::Fake;
use rand::Rng;
use uuid::Uuid;

use crate::catalog::types::DataType;
use crate::synth::value::Value;

/// Wrap a dynamically generated String into a Value::String.
#[inline]
fn owned(s: String) -> Value {
    Value::String(Cow::Owned(s))
}

/// Synthesize a plausible literal for a column of the given type,
/// honoring the declared size limit for string types.
pub fn synthesize(data_type: &DataType, max_length: Option<u32>, rng: &mut impl Rng) -> Value {
    match data_type {
        DataType::SmallInt => Value::Int(rng.random_range(1..=i16::MAX as i64)),
        DataType::Integer | DataType::BigInt => Value::Int(rng.random_range(1..=100_000)),
        DataType::Float | DataType::Double => {
            Value::Float((rng.random_range(0.0..10_000.0f64) * 100.0).round() / 100.0)
        }
        DataType::Numeric => {
            Value::Float((rng.random_range(0.0..1_000.0f64) * 100.0).round() / 100.0)
        }
        DataType::Char | DataType::VarChar | DataType::Text => {
            let words: Vec<String> = Words(1..4).fake_with_rng(rng);
            owned(fit(words.join(" "), max_length))
        }
        DataType::Boolean => Value::Bool(rng.random()),
        DataType::Date => {
            let days = rng.random_range(0..365);
            Value::Date(Utc::now().date_naive() - ChronoDuration::days(days))
        }
        DataType::Time => {
            let secs = rng.random_range(0..86_400);
            Value::Time(NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap_or_default())
        }
        DataType::Timestamp | DataType::TimestampTz => {
            let minutes = rng.random_range(0..525_600i64);
            Value::Timestamp(Utc::now().naive_utc() - ChronoDuration::minutes(minutes))
        }
        DataType::Uuid => Value::Uuid(Uuid::new_v4()),
        DataType::Json | DataType::Jsonb => {
            let word: String = Word().fake_with_rng(rng);
            Value::Json(serde_json::json!({ "label": word }))
        }
        DataType::Binary => {
            let bytes: Vec<u8> = (0..8).map(|_| rng.random()).collect();
            Value::Bytes(bytes)
        }
        // Best effort for types we don't model: a short string, which
        // PostgreSQL will coerce for most text-castable types.
        DataType::Unknown(_) => {
            let word: String = Word().fake_with_rng(rng);
            owned(fit(word, max_length))
        }
    }
}

/// Truncate a string to a declared character limit, if any.
fn fit(s: String, max_length: Option<u32>) -> String {
    match max_length {
        Some(limit) if s.chars().count() > limit as usize => {
            s.chars().take(limit as usize).collect()
        }
        _ => s,
    }
}

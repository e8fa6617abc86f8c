use serde_json::{json, Map, Value};
use shared::ClassifierId;
use std::collections::BTreeMap;

use super::error::ClassifyError;
use super::models::{AggregatedResponse, MethodOutcome, OutcomeStatus};
use crate::recognition::error::ServiceFailure;

/// Recursively merges `source` into `target`. Objects are merged key by key,
/// arrays position by position (extra source elements are appended), anything
/// else in `source` replaces what is in `target`.
pub fn deep_merge(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(target), Value::Array(source)) => {
            for (index, value) in source.into_iter().enumerate() {
                match target.get_mut(index) {
                    Some(existing) => deep_merge(existing, value),
                    None => target.push(value),
                }
            }
        }
        (target, source) => *target = source,
    }
}

/// URL-safe encoding of what a method produced: its value on success, its
/// error payload otherwise.
fn encode_raw(outcome: &MethodOutcome) -> String {
    let payload = match (&outcome.value, &outcome.error) {
        (Some(value), _) => value.clone(),
        (None, Some(failure)) => failure.body.clone(),
        (None, None) => Value::Null,
    };
    urlencoding::encode(&payload.to_string()).into_owned()
}

pub fn aggregate(
    outcomes: &[MethodOutcome],
    requested: Option<&ClassifierId>,
) -> Result<AggregatedResponse, ClassifyError> {
    let mut merged = Value::Object(Map::new());
    let mut succeeded = 0usize;

    for outcome in outcomes {
        if outcome.status == OutcomeStatus::Success {
            if let Some(value) = &outcome.value {
                deep_merge(&mut merged, value.clone());
                succeeded += 1;
            }
        }
    }

    if succeeded == 0 {
        let failure = outcomes
            .iter()
            .find_map(|outcome| outcome.error.clone())
            .unwrap_or_else(|| ServiceFailure {
                code: 500,
                body: json!({ "error": "No classification method produced a result", "code": 500 }),
            });
        return Err(ClassifyError::Service(failure));
    }

    let merged = match merged {
        Value::Object(map) => map,
        // A method answered with a non-object document; keep it under its own key.
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    };

    let raw: BTreeMap<String, String> = outcomes
        .iter()
        .map(|outcome| (outcome.method.to_string(), encode_raw(outcome)))
        .collect();

    Ok(AggregatedResponse {
        merged,
        classifier_ids: requested.cloned(),
        raw,
    })
}

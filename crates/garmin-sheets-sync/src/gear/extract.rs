//! Shape-tolerant readers for gear payloads.
//!
//! Connect has returned gear under several keys and in several layouts
//! over time; these helpers accept all of them and never fail.

use serde_json::{Map, Value};

use crate::models::GearRecord;

/// Keys that may hold a gear list inside an activity payload
pub const GEAR_LIST_KEYS: [&str; 5] = [
    "gear",
    "activityGearDTOs",
    "activityGear",
    "gears",
    "activityGearList",
];

/// Keys that may hold a gear list inside a gear-service response
pub const GEAR_SERVICE_LIST_KEYS: [&str; 3] = ["gearList", "gear", "gears"];

/// Display-name fields on a gear item, most specific first
pub const NAME_KEYS: [&str; 5] = [
    "displayName",
    "customMakeModel",
    "name",
    "gearName",
    "model",
];

/// Catalog entries prefer the user's own label
pub const CATALOG_NAME_KEYS: [&str; 3] = ["customMakeModel", "displayName", "name"];

/// Identifier fields on a gear item
pub const ID_KEYS: [&str; 4] = ["gearId", "gearPk", "id", "uuid"];

/// Render a scalar as text. Integral floats lose their `.0`.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().filter(|f| f.is_finite()).map(|f| {
                    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                        (f as i64).to_string()
                    } else {
                        f.to_string()
                    }
                })
            }
        }
        _ => None,
    }
}

/// First non-empty value among `keys`
pub fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| obj.get(*k).and_then(scalar_text))
}

/// Every non-empty identifier on a gear item, in `ID_KEYS` order
pub fn all_ids(obj: &Map<String, Value>) -> Vec<String> {
    ID_KEYS
        .iter()
        .filter_map(|k| obj.get(*k).and_then(scalar_text))
        .collect()
}

/// Locate a gear list: a bare array, or the first non-empty array under
/// `keys`. Empty lists count as absent.
pub fn gear_list<'a>(payload: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    match payload {
        Value::Array(items) if !items.is_empty() => Some(items),
        Value::Object(obj) => keys.iter().find_map(|k| {
            obj.get(*k)
                .and_then(Value::as_array)
                .filter(|items| !items.is_empty())
        }),
        _ => None,
    }
}

/// Extract the shoe from an activity-level payload.
///
/// A non-empty gear list wins when present; only its first item is used.
/// Without one, flat `gearName`/`gearId` fields are read from the payload
/// or its `summaryDTO`.
pub fn shoe_from_detail(payload: &Value) -> GearRecord {
    if let Some(items) = gear_list(payload, &GEAR_LIST_KEYS) {
        return items
            .first()
            .and_then(Value::as_object)
            .map(|item| GearRecord {
                name: first_text(item, &NAME_KEYS).unwrap_or_default(),
                id: first_text(item, &ID_KEYS).unwrap_or_default(),
            })
            .unwrap_or_default();
    }

    let Some(obj) = payload.as_object() else {
        return GearRecord::default();
    };

    let flat = |o: &Map<String, Value>| GearRecord {
        name: first_text(o, &["gearName"]).unwrap_or_default(),
        id: first_text(o, &["gearId"]).unwrap_or_default(),
    };

    let top = flat(obj);
    if !top.is_empty() {
        return top;
    }
    obj.get("summaryDTO")
        .and_then(Value::as_object)
        .map(flat)
        .unwrap_or_default()
}

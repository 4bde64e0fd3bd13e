use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Treats an explicit `null` the same as a missing field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserializes a list row by row, dropping rows that do not fit `T`.
/// Anything other than an array reads as an empty list.
pub fn skip_invalid_rows<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let rows = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(rows)) => rows,
        _ => return Ok(Vec::new()),
    };
    Ok(rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value::<T>(row) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::debug!(index, error = %err, "skipping malformed row");
                None
            }
        })
        .collect())
}

/// Like [`skip_invalid_rows`] but keeps positions: a row that does not fit
/// `T` becomes `T::default()`.
pub fn default_invalid_rows<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let rows = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(rows)) => rows,
        _ => return Ok(Vec::new()),
    };
    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            serde_json::from_value::<T>(row).unwrap_or_else(|err| {
                tracing::debug!(index, error = %err, "malformed row read as empty");
                T::default()
            })
        })
        .collect())
}

/// Number or numeric string; unusable values read as 0.
pub fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_u32(deserializer)?.unwrap_or_default())
}

pub fn lenient_opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(value_as_u32))
}

pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or_default(),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or_default(),
        _ => 0.0,
    })
}

pub fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_u64(deserializer)?.unwrap_or_default())
}

pub fn lenient_opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(value_as_u64))
}

/// Reads a whole number from a number or a string. Strings keep their
/// leading digits, so `"45+2"` reads as 45.
pub fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && *f < u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => {
            let trimmed = s.trim();
            let digits_end = trimmed
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(trimmed.len());
            trimmed[..digits_end].parse::<u64>().ok()
        }
        _ => None,
    }
}

/// Like [`value_as_u64`], rejecting values outside the `u32` range.
pub fn value_as_u32(value: &Value) -> Option<u32> {
    value_as_u64(value).and_then(|num| u32::try_from(num).ok())
}

/// Returns `true` for bodies upstream uses to mean "nothing here".
pub fn is_blank_body(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || trimmed == "null"
}

pub fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(v) = value.get(*key) {
            if let Some(name) = as_string(v) {
                return Some(name);
            }
        }
    }
    None
}

pub fn pick_u32(value: &Value, keys: &[&str]) -> Option<u32> {
    for key in keys {
        if let Some(num) = value.get(*key).and_then(value_as_u32) {
            return Some(num);
        }
    }
    None
}

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => {
            if let Some(Value::String(name)) = map.get("name") {
                return Some(name.trim().to_string());
            }
            if let Some(Value::String(name)) = map.get("Name") {
                return Some(name.trim().to_string());
            }
            None
        }
        _ => None,
    }
}

/*
[INPUT]:  Loosely typed JSON amounts (strings, numbers, null, "")
[OUTPUT]: rust_decimal values for typed records
[POS]:    Data layer - shared serde adapters
[UPDATE]: When the server starts sending a new amount encoding
*/

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

fn decimal_from_value<E: serde::de::Error>(value: Value) -> Result<Decimal, E> {
    match value {
        Value::Null => Ok(Decimal::ZERO),
        Value::String(raw) => {
            let raw = raw.trim();
            if raw.is_empty() {
                return Ok(Decimal::ZERO);
            }
            Decimal::from_str(raw)
                .or_else(|_| Decimal::from_scientific(raw))
                .map_err(E::custom)
        }
        Value::Number(number) => {
            let raw = number.to_string();
            Decimal::from_str(&raw)
                .or_else(|_| Decimal::from_scientific(&raw))
                .map_err(E::custom)
        }
        other => Err(E::custom(format!("invalid decimal value: {other}"))),
    }
}

/// Decimal encoded as a string on the way out, anything numeric-looking on the way in.
pub mod decimal {
    use super::*;

    pub fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        decimal_from_value(Value::deserialize(deserializer)?)
    }
}

/// Optional decimal; `null` and `""` decode to `None`.
pub mod decimal_option {
    use super::*;

    pub fn serialize<S>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_str(&value.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            Value::String(raw) if raw.trim().is_empty() => Ok(None),
            other => decimal_from_value(other).map(Some),
        }
    }
}

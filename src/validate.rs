// Payload Validation
// Decoding entry points that turn wire JSON into validated values.

use crate::config::ValidationConfig;
use crate::errors::ValidationError;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Checks a decoded value beyond what its serde shape enforces
pub trait Validate {
    fn validate(&self, config: &ValidationConfig) -> Result<(), ValidationError>;
}

/// A union resolved by its `type` string
pub trait Discriminated {
    /// Human-readable union name used in errors
    const UNION: &'static str;
    /// Every `type` string with a matching variant
    const TYPES: &'static [&'static str];

    /// The `type` string of this value
    fn type_name(&self) -> &'static str;
}

/// Decode and validate a payload with the default (strict) configuration
pub fn decode<T>(json: &str) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Validate,
{
    decode_with(json, &ValidationConfig::default())
}

/// Decode and validate a payload
pub fn decode_with<T>(json: &str, config: &ValidationConfig) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Validate,
{
    let value: T = serde_json::from_str(json)?;
    value.validate(config)?;
    Ok(value)
}

/// Decode a tagged union, reporting an unknown `type` as a shape error
pub fn decode_tagged<T>(json: &str, config: &ValidationConfig) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Validate + Discriminated,
{
    let raw: Value = serde_json::from_str(json)?;
    from_value_tagged(raw, config)
}

/// Same as [`decode_tagged`] for an already-parsed JSON value
pub fn from_value_tagged<T>(raw: Value, config: &ValidationConfig) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Validate + Discriminated,
{
    check_discriminant::<T>(&raw)?;
    let value: T = serde_json::from_value(raw)?;
    value.validate(config)?;
    Ok(value)
}

/// Verify that `raw.type` names a variant of `T`
pub fn check_discriminant<T: Discriminated>(raw: &Value) -> Result<(), ValidationError> {
    let tag = raw
        .get("type")
        .and_then(Value::as_str)
        .ok_or(ValidationError::MissingDiscriminant { union: T::UNION })?;
    if T::TYPES.contains(&tag) {
        Ok(())
    } else {
        tracing::debug!(union = T::UNION, tag, "rejecting unknown discriminant");
        Err(ValidationError::UnknownDiscriminant {
            union: T::UNION,
            value: tag.to_string(),
        })
    }
}

/// A string, or a list of values from a tagged union
pub(crate) enum TextOrTagged<T> {
    Text(String),
    Tagged(Vec<T>),
}

/// Deserialize a string-or-list field, checking each element's `type` before
/// its shape so an unknown discriminant is reported by name
pub(crate) fn text_or_tagged<'de, D, T>(
    deserializer: D,
    expected: &str,
) -> Result<TextOrTagged<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Discriminated,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(TextOrTagged::Text(text)),
        Value::Array(values) => values
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                check_discriminant::<T>(&raw)
                    .map_err(|e| D::Error::custom(format!("element {}: {}", index, e)))?;
                serde_json::from_value(raw)
                    .map_err(|e| D::Error::custom(format!("element {}: {}", index, e)))
            })
            .collect::<Result<Vec<T>, D::Error>>()
            .map(TextOrTagged::Tagged),
        _ => Err(D::Error::custom(format!("expected {}", expected))),
    }
}

/// Validate every element of a list, prefixing errors with `field[index]`
pub(crate) fn validate_all<T: Validate>(
    field: &str,
    items: &[T],
    config: &ValidationConfig,
) -> Result<(), ValidationError> {
    for (index, item) in items.iter().enumerate() {
        item.validate(config)
            .map_err(|e| e.within(format!("{}[{}]", field, index)))?;
    }
    Ok(())
}

/// Reject an optional float outside `[min, max]`
pub(crate) fn check_range(
    field: &str,
    value: Option<f64>,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    match value {
        Some(v) if !(min..=max).contains(&v) => Err(ValidationError::field(
            field,
            format!("{} is outside [{}, {}]", v, min, max),
        )),
        _ => Ok(()),
    }
}

/// Reject an optional integer outside `[min, max]`
pub(crate) fn check_int_range(
    field: &str,
    value: Option<i64>,
    min: i64,
    max: i64,
) -> Result<(), ValidationError> {
    match value {
        Some(v) if v < min || v > max => Err(ValidationError::field(
            field,
            format!("{} is outside [{}, {}]", v, min, max),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_range() {
        assert!(check_range("temperature", Some(0.7), 0.0, 2.0).is_ok());
        assert!(check_range("temperature", None, 0.0, 2.0).is_ok());
        assert!(check_range("temperature", Some(2.0), 0.0, 2.0).is_ok());
        let err = check_range("temperature", Some(2.5), 0.0, 2.0).unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn test_check_discriminant() {
        use crate::openresponses::Item;

        assert!(check_discriminant::<Item>(&serde_json::json!({"type": "message"})).is_ok());
        let err = check_discriminant::<Item>(&serde_json::json!({"type": "computer_call"}))
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown item type `computer_call`");
        let err = check_discriminant::<Item>(&serde_json::json!({"id": "x"})).unwrap_err();
        assert!(matches!(err, ValidationError::MissingDiscriminant { union: "item" }));
    }

    #[test]
    fn test_check_int_range() {
        assert!(check_int_range("top_logprobs", Some(20), 0, 20).is_ok());
        assert!(check_int_range("top_logprobs", Some(21), 0, 20).is_err());
        assert!(check_int_range("top_logprobs", Some(-1), 0, 20).is_err());
    }
}

use serde::{Deserialize, Deserializer, de::Error};
use tracing::debug;

/// Rejects `null`, `""` and whitespace-only strings. The value is kept as-is,
/// surrounding whitespace included.
pub fn disallow_empty_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let input_string: Option<String> = Option::deserialize(deserializer)?;

    let Some(value) = input_string else {
        return Err(Error::custom("field is not a string"));
    };

    if value.trim().is_empty() {
        debug!("Rejecting blank string: {value:?}");
        return Err(Error::custom("field is empty"));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::disallow_empty_string;

    #[derive(Deserialize, Debug)]
    struct Wrapper {
        #[serde(deserialize_with = "disallow_empty_string")]
        value: String,
    }

    #[test]
    fn keeps_non_empty_value() {
        let parsed: Wrapper = serde_json::from_str(r#"{"value": " abst/(qubit) "}"#).unwrap();

        assert_eq!(parsed.value, " abst/(qubit) ");
    }

    #[test]
    fn rejects_empty_and_blank() {
        assert!(serde_json::from_str::<Wrapper>(r#"{"value": ""}"#).is_err());
        assert!(serde_json::from_str::<Wrapper>(r#"{"value": "   "}"#).is_err());
        assert!(serde_json::from_str::<Wrapper>(r#"{"value": null}"#).is_err());
    }
}

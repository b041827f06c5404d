use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A single disclosure harvested by the crawl.
///
/// Only `id` and `title` take part in deduplication; every other field
/// extracted from the page lands in `payload` and is written back out untouched.
/// The identities are written back in the shape they arrived in, so a numeric
/// patent number stays a number.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(try_from = "WireRecord", into = "WireRecord")]
pub struct Record {
    pub id: String,
    pub title: String,
    pub payload: Map<String, Value>,
    // identity values as read, `None` for records built in code
    source_id: Option<Value>,
    source_title: Option<Value>,
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.title == other.title && self.payload == other.payload
    }
}

impl Record {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }
}

#[derive(Deserialize, Serialize)]
struct WireRecord {
    #[serde(rename = "patent_num", alias = "id")]
    #[serde(deserialize_with = "present", default, skip_serializing_if = "Option::is_none")]
    id: Option<Value>,
    #[serde(rename = "patent_name", alias = "title")]
    #[serde(deserialize_with = "present", default, skip_serializing_if = "Option::is_none")]
    title: Option<Value>,
    #[serde(flatten)]
    payload: Map<String, Value>,
}

// keeps an explicit `null` apart from a missing field
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

// extractors hand us `null` for fields the page did not have, and some
// emit the patent number as a bare JSON number
fn identity_key(value: Option<&Value>) -> Result<String, String> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(value)) => Ok(value.clone()),
        Some(Value::Number(number)) => Ok(number.to_string()),
        Some(other) => Err(format!("expected a string identity, found {other}")),
    }
}

impl TryFrom<WireRecord> for Record {
    type Error = String;

    fn try_from(wire: WireRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: identity_key(wire.id.as_ref())?,
            title: identity_key(wire.title.as_ref())?,
            payload: wire.payload,
            source_id: wire.id,
            source_title: wire.title,
        })
    }
}

// the source value wins as long as the key derived from it still matches,
// and a field that was absent stays absent while it is still empty
fn wire_identity(key: String, source: Option<Value>) -> Option<Value> {
    match source {
        Some(value) if identity_key(Some(&value)).as_deref() == Ok(key.as_str()) => Some(value),
        None if key.is_empty() => None,
        _ => Some(Value::String(key)),
    }
}

impl From<Record> for WireRecord {
    fn from(record: Record) -> Self {
        Self {
            id: wire_identity(record.id, record.source_id),
            title: wire_identity(record.title, record.source_title),
            payload: record.payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::Record;

    #[test]
    fn reads_extractor_field_names() {
        let record: Record = serde_json::from_value(json!({
            "patent_num": "9,876,543",
            "patent_name": "Quantum repeater",
            "document_identifier": "US 9876543 B1",
        }))
        .unwrap();

        assert_eq!(record.id, "9,876,543");
        assert_eq!(record.title, "Quantum repeater");
        assert_eq!(record.payload["document_identifier"], "US 9876543 B1");
    }

    #[test]
    fn reads_short_aliases() {
        let record: Record = serde_json::from_value(json!({"id": "1", "title": "A"})).unwrap();

        assert_eq!(record, Record::new("1", "A"));
    }

    #[test]
    fn missing_and_null_identities_are_empty() {
        let record: Record = serde_json::from_value(json!({
            "patent_name": null,
            "abstract": "entangled photon source",
        }))
        .unwrap();

        assert_eq!(record.id, "");
        assert_eq!(record.title, "");
        assert_eq!(record.payload.len(), 1);
    }

    #[test]
    fn numeric_id_becomes_string_key() {
        let record: Record = serde_json::from_value(json!({"patent_num": 1234567})).unwrap();

        assert_eq!(record.id, "1234567");
    }

    #[test]
    fn rejects_structured_identity() {
        let parsed = serde_json::from_value::<Record>(json!({"patent_num": ["1"]}));

        assert!(parsed.is_err());
    }

    #[test]
    fn payload_passes_through_serialization() {
        let record = Record::new("42", "Single photon detector")
            .with_field("inventors", json!(["A. Smith", "B. Jones"]))
            .with_field("filed", "2014-03-02");

        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(
            value,
            json!({
                "patent_num": "42",
                "patent_name": "Single photon detector",
                "inventors": ["A. Smith", "B. Jones"],
                "filed": "2014-03-02",
            })
        );
    }

    #[test]
    fn identities_keep_their_json_shape() {
        let lines = [
            json!({"patent_num": 1234567, "patent_name": "A"}),
            json!({"patent_num": "7", "patent_name": null, "abstract": "qubit"}),
            json!({"patent_name": "No number"}),
        ];

        for line in lines {
            let record: Record = serde_json::from_value(line.clone()).unwrap();

            assert_eq!(serde_json::to_value(&record).unwrap(), line);
        }
    }

    #[test]
    fn edited_identity_is_written_as_string() {
        let mut record: Record = serde_json::from_value(json!({"patent_num": 5})).unwrap();
        record.id = "US5".into();

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"patent_num": "US5"})
        );
    }
}

/// Per-record decoding for upstream lists
///
/// List fields decoded through `skip_malformed` keep every element that
/// parses and drop the rest, so one bad pool or pair costs only itself.
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::logger::{self, LogTag};

/// `deserialize_with` target for `Vec<T>` fields; `null` reads as empty
pub fn skip_malformed<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(parse_records(raw.unwrap_or_default()))
}

pub fn parse_records<T: DeserializeOwned>(values: Vec<Value>) -> Vec<T> {
    let total = values.len();
    let records: Vec<T> = values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                logger::debug(LogTag::Api, &format!("Skipping malformed record: {}", e));
                None
            }
        })
        .collect();

    if records.len() < total {
        logger::warning(
            LogTag::Api,
            &format!("Skipped {} of {} malformed records", total - records.len(), total),
        );
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: String,
        size: u32,
    }

    #[derive(Debug, Deserialize)]
    struct Listing {
        #[serde(default, deserialize_with = "skip_malformed")]
        items: Vec<Item>,
    }

    #[test]
    fn bad_elements_are_dropped_individually() {
        let listing: Listing = serde_json::from_value(json!({
            "items": [
                {"id": "a", "size": 1},
                {"size": 2},
                {"id": "c", "size": -3},
                "junk",
                {"id": "e", "size": 5}
            ]
        }))
        .unwrap();

        let ids: Vec<_> = listing.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "e"]);
    }

    #[test]
    fn null_and_missing_lists_are_empty() {
        let listing: Listing = serde_json::from_value(json!({"items": null})).unwrap();
        assert!(listing.items.is_empty());

        let listing: Listing = serde_json::from_value(json!({})).unwrap();
        assert!(listing.items.is_empty());
    }

    #[test]
    fn non_list_value_is_still_an_error() {
        assert!(serde_json::from_value::<Listing>(json!({"items": "nope"})).is_err());
    }
}

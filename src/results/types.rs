//! Result type definitions

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One name/value specification of an asset, e.g. `("Hours", "1500")`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSpecification {
    pub name: String,
    pub value: String,
}

impl AssetSpecification {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A single asset listing found on a target website
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Full item description
    pub description: String,
    /// Location of the asset
    pub location: String,
    /// Listed price if available
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub specifications: Vec<AssetSpecification>,
    /// Contact information
    #[serde(default)]
    pub contact: Option<String>,
    /// Source website
    pub website: String,
    /// When the listing was extracted
    #[serde(default = "Utc::now", deserialize_with = "lenient_datetime")]
    pub datetime: DateTime<Utc>,
}

impl SearchResult {
    /// Create a new result stamped with the current time
    pub fn new(
        description: impl Into<String>,
        location: impl Into<String>,
        website: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            location: location.into(),
            price: None,
            specifications: Vec::new(),
            contact: None,
            website: website.into(),
            datetime: Utc::now(),
        }
    }

    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }

    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = Some(contact.into());
        self
    }

    pub fn with_spec(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.specifications.push(AssetSpecification::new(name, value));
        self
    }

    /// Parse a model reply: a JSON array of result objects
    pub fn parse_list(text: &str) -> serde_json::Result<Vec<SearchResult>> {
        serde_json::from_str(text.trim())
    }
}

/// Model-written timestamps come in assorted shapes; anything unreadable
/// falls back to the time of extraction.
fn lenient_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let parsed = match raw {
        Some(serde_json::Value::String(s)) => parse_timestamp(&s),
        _ => None,
    };
    Ok(parsed.unwrap_or_else(Utc::now))
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_full_item() {
        let text = r#"[{
            "description": "2019 Volvo A40G articulated hauler",
            "location": "Charlotte, NC",
            "price": "$325,000",
            "specifications": [{"name": "Hours", "value": "1500"}],
            "contact": "Carolina Excavation, 555-0100",
            "website": "https://www.rbauction.com/",
            "datetime": "2024-03-01T12:30:00Z"
        }]"#;

        let results = SearchResult::parse_list(text).unwrap();
        assert_eq!(results.len(), 1);
        let r = &results[0];
        assert_eq!(r.price.as_deref(), Some("$325,000"));
        assert_eq!(r.specifications, vec![AssetSpecification::new("Hours", "1500")]);
        assert_eq!(r.datetime, Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap());
    }

    #[test]
    fn test_optional_fields_default() {
        let text = r#"[{"description": "Loader", "location": "Austin, TX", "website": "https://a.example.com"}]"#;
        let before = Utc::now();
        let results = SearchResult::parse_list(text).unwrap();
        let r = &results[0];
        assert!(r.price.is_none());
        assert!(r.contact.is_none());
        assert!(r.specifications.is_empty());
        assert!(r.datetime >= before);
    }

    #[test]
    fn test_naive_and_unreadable_datetimes() {
        let text = r#"[
            {"description": "a", "location": "b", "website": "c", "datetime": "2024-05-06 07:08:09"},
            {"description": "a", "location": "b", "website": "c", "datetime": "yesterday afternoon"},
            {"description": "a", "location": "b", "website": "c", "datetime": null}
        ]"#;
        let before = Utc::now();
        let results = SearchResult::parse_list(text).unwrap();
        assert_eq!(
            results[0].datetime,
            Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()
        );
        assert!(results[1].datetime >= before);
        assert!(results[2].datetime >= before);
    }

    #[test]
    fn test_missing_required_field_fails() {
        let text = r#"[{"description": "Loader", "website": "https://a.example.com"}]"#;
        assert!(SearchResult::parse_list(text).is_err());
    }

    #[test]
    fn test_non_array_reply_fails() {
        assert!(SearchResult::parse_list("I could not access the website.").is_err());
        assert!(SearchResult::parse_list(r#"{"description": "x"}"#).is_err());
    }

    #[test]
    fn test_serialized_shape() {
        let result = SearchResult::new("Forklift", "Denver, CO", "https://f.example.com")
            .with_spec("Capacity", "5000 lb");
        let value = serde_json::to_value(&result).unwrap();
        assert!(value["price"].is_null());
        assert!(value["contact"].is_null());
        assert_eq!(value["specifications"][0]["name"], "Capacity");
        assert!(value["datetime"].is_string());
    }
}

use std::fmt;

use serde::de::value::{MapAccessDeserializer, SeqAccessDeserializer};
use serde::de::{IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::ServiceError;

/// Category given to services created without one.
pub const UNCATEGORIZED: &str = "Uncategorized";

fn default_category() -> String {
    UNCATEGORIZED.to_string()
}

// 旧数据里可能写的是 null，按缺省处理
fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

fn null_as_uncategorized<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(normalize_category(Option::<String>::deserialize(d)?))
}

/// One catalogued link shown as a card on the dashboard.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceRecord {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default = "default_category", deserialize_with = "null_as_uncategorized")]
    pub category: String,
}

/// The persisted document: `{ "services": [...] }`.
///
/// Older data files hold a bare array, which is accepted on load and written
/// back in the object shape on the next save.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct ServiceCollection {
    pub services: Vec<ServiceRecord>,
}

#[derive(Deserialize)]
struct Document {
    services: Vec<ServiceRecord>,
}

// Dispatch on the top-level shape so the error of the matching shape is reported as-is.
impl<'de> Deserialize<'de> for ServiceCollection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CollectionVisitor;

        impl<'de> Visitor<'de> for CollectionVisitor {
            type Value = ServiceCollection;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object with a `services` list or a bare list of services")
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
                let doc = Document::deserialize(MapAccessDeserializer::new(map))?;
                Ok(ServiceCollection { services: doc.services })
            }

            fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Self::Value, A::Error> {
                let services = Vec::<ServiceRecord>::deserialize(SeqAccessDeserializer::new(seq))?;
                Ok(ServiceCollection { services })
            }
        }

        deserializer.deserialize_any(CollectionVisitor)
    }
}

impl ServiceCollection {
    pub fn position(&self, id: &str) -> Option<usize> {
        self.services.iter().position(|s| s.id == id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.position(id).is_some()
    }
}

/// Create input. `id` is optional; a blank one counts as absent.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct NewService {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl NewService {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self { name: Some(name.into()), url: Some(url.into()), ..Default::default() }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Caller-supplied id, if any non-blank one was given.
    pub fn requested_id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        require("name", self.name.as_deref())?;
        require("url", self.url.as_deref())?;
        Ok(())
    }

    /// Build the record to store under `id`. Call `validate` first.
    pub fn into_record(self, id: String) -> ServiceRecord {
        ServiceRecord {
            id,
            name: self.name.unwrap_or_default().trim().to_string(),
            url: self.url.unwrap_or_default().trim().to_string(),
            description: self.description.unwrap_or_default(),
            category: normalize_category(self.category),
        }
    }
}

/// Partial update. Only the listed fields can change; anything else is rejected
/// when the body is parsed. A supplied `id` is accepted and ignored.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ServicePatch {
    #[serde(default, rename = "id", skip_serializing)]
    ignored_id: Option<IgnoredAny>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl ServicePatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Shallow merge into `record`; fields absent from the patch keep their value.
    pub fn apply_to(self, record: &mut ServiceRecord) -> Result<(), ServiceError> {
        if let Some(name) = self.name.as_deref() {
            record.name = require("name", Some(name))?.to_string();
        }
        if let Some(url) = self.url.as_deref() {
            record.url = require("url", Some(url))?.to_string();
        }
        if let Some(description) = self.description {
            record.description = description;
        }
        if self.category.is_some() {
            record.category = normalize_category(self.category);
        }
        Ok(())
    }
}

fn require<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, ServiceError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ServiceError::Validation(format!("{field} is required"))),
    }
}

fn normalize_category(category: Option<String>) -> String {
    match category {
        Some(c) if !c.trim().is_empty() => c,
        _ => default_category(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ServiceRecord {
        ServiceRecord {
            id: "1".into(),
            name: "A".into(),
            url: "http://a".into(),
            description: "d".into(),
            category: "c".into(),
        }
    }

    #[test]
    fn patch_merges_only_supplied_fields() {
        let mut rec = record();
        ServicePatch::default().name("B").apply_to(&mut rec).unwrap();
        assert_eq!(
            rec,
            ServiceRecord {
                id: "1".into(),
                name: "B".into(),
                url: "http://a".into(),
                description: "d".into(),
                category: "c".into(),
            }
        );
    }

    #[test]
    fn patch_ignores_id_and_rejects_unknown_fields() {
        let patch: ServicePatch = serde_json::from_str(r#"{"id":"other","name":"B"}"#).unwrap();
        let mut rec = record();
        patch.apply_to(&mut rec).unwrap();
        assert_eq!(rec.id, "1");
        assert_eq!(rec.name, "B");

        let unknown = serde_json::from_str::<ServicePatch>(r#"{"name":"B","icon":"x"}"#);
        assert!(unknown.is_err());
    }

    #[test]
    fn patch_cannot_blank_required_fields() {
        let mut rec = record();
        let err = ServicePatch::default().url("  ").apply_to(&mut rec).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(rec, record());
    }

    #[test]
    fn new_service_defaults_and_validation() {
        let input: NewService = serde_json::from_str(r#"{"name":"Router","url":"http://192.168.1.1"}"#).unwrap();
        input.validate().unwrap();
        assert_eq!(input.requested_id(), None);
        let rec = input.into_record("x".into());
        assert_eq!(rec.description, "");
        assert_eq!(rec.category, UNCATEGORIZED);

        let missing_name: NewService = serde_json::from_str(r#"{"url":"http://x"}"#).unwrap();
        assert!(matches!(missing_name.validate(), Err(ServiceError::Validation(_))));
        let blank_url = NewService::new("x", " ");
        assert!(matches!(blank_url.validate(), Err(ServiceError::Validation(_))));
        assert_eq!(NewService::new("a", "b").with_id("  ").requested_id(), None);
    }

    #[test]
    fn collection_accepts_legacy_bare_array() {
        let legacy: ServiceCollection =
            serde_json::from_str(r#"[{"id":"1","name":"A","url":"http://a"}]"#).unwrap();
        assert_eq!(legacy.services.len(), 1);
        assert_eq!(legacy.services[0].category, UNCATEGORIZED);

        let written = serde_json::to_value(&legacy).unwrap();
        assert!(written["services"].is_array());

        assert!(serde_json::from_str::<ServiceCollection>(r#"{"services":"nope"}"#).is_err());
        assert!(serde_json::from_str::<ServiceCollection>("{}").is_err());
    }

    #[test]
    fn null_optional_fields_load_as_defaults() {
        let doc: ServiceCollection = serde_json::from_str(
            r#"{"services":[{"id":"1","name":"A","url":"http://a","description":null,"category":null}]}"#,
        )
        .unwrap();
        assert_eq!(doc.services[0].description, "");
        assert_eq!(doc.services[0].category, UNCATEGORIZED);

        let legacy: ServiceCollection =
            serde_json::from_str(r#"[{"id":"2","name":"B","url":"http://b","category":null}]"#).unwrap();
        assert_eq!(legacy.services[0].category, UNCATEGORIZED);

        // required fields stay required
        assert!(serde_json::from_str::<ServiceCollection>(r#"{"services":[{"id":"1","name":null,"url":"u"}]}"#).is_err());
    }

    #[test]
    fn document_errors_name_the_actual_problem() {
        let err = serde_json::from_str::<ServiceCollection>("{}").unwrap_err().to_string();
        assert!(err.contains("missing field `services`"), "{err}");

        let err = serde_json::from_str::<ServiceCollection>(r#"{"services":"nope"}"#).unwrap_err().to_string();
        assert!(err.contains("expected a sequence"), "{err}");
        assert!(!err.contains("untagged"), "{err}");

        let err = serde_json::from_str::<ServiceCollection>(r#"{"services":[{"id":"1","url":"u"}]}"#)
            .unwrap_err()
            .to_string();
        assert!(err.contains("missing field `name`"), "{err}");

        let err = serde_json::from_str::<ServiceCollection>("42").unwrap_err().to_string();
        assert!(err.contains("bare list of services"), "{err}");
    }
}

use serde::{Deserialize, Deserializer};

mod client;
mod prospect;

pub use client::{Client, ClientPatch, ClientStatus, NewClient};
pub use prospect::{NewProspect, Prospect, ProspectPatch};

/// Deserializer for a clearable field of an update body. Paired with
/// `#[serde(default)]`: an absent key stays `None`, an explicit `null`
/// becomes `Some(None)`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Input that cannot be persisted, with a message fit for the caller
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    fn failed(resource: &str, problems: Vec<String>) -> Self {
        Self(format!("{resource} validation failed: {}", problems.join(", ")))
    }
}

/// Collects required-field problems for one record
fn require(problems: &mut Vec<String>, field: &str, value: &str) {
    if value.trim().is_empty() {
        problems.push(format!("{field} is required"));
    }
}

/// Like [`require`], but only when the field was supplied
fn require_if_present(problems: &mut Vec<String>, field: &str, value: Option<&str>) {
    if let Some(value) = value {
        if value.trim().is_empty() {
            problems.push(format!("{field} cannot be blank"));
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{require, require_if_present, ValidationError};

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Prospect {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub place: String,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a create request. Missing required fields deserialize as
/// empty strings and are caught by [`NewProspect::validate`].
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct NewProspect {
    pub name: String,
    pub place: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl NewProspect {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut problems = Vec::new();
        require(&mut problems, "name", &self.name);
        require(&mut problems, "place", &self.place);

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::failed("Prospect", problems))
        }
    }
}

/// Body of an update request; `None` leaves the stored value untouched.
/// `location` is clearable: `Some(None)` (a JSON `null`) removes it.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ProspectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(
        deserialize_with = "super::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub location: Option<Option<String>>,
}

impl ProspectPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut problems = Vec::new();
        require_if_present(&mut problems, "name", self.name.as_deref());
        require_if_present(&mut problems, "place", self.place.as_deref());

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::failed("Prospect", problems))
        }
    }

    /// Apply the supplied fields to a stored record
    pub fn apply_to(&self, prospect: &mut Prospect) {
        if let Some(name) = &self.name {
            prospect.name = name.clone();
        }
        if let Some(place) = &self.place {
            prospect.place = place.clone();
        }
        if let Some(location) = &self.location {
            prospect.location = location.clone();
        }
    }
}

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{require, require_if_present, ValidationError};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    #[default]
    Started,
    Ongoing,
    Closed,
}

impl ClientStatus {
    pub const ALL: [ClientStatus; 3] = [
        ClientStatus::Started,
        ClientStatus::Ongoing,
        ClientStatus::Closed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ClientStatus::Started => "started",
            ClientStatus::Ongoing => "ongoing",
            ClientStatus::Closed => "closed",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ClientStatus::Started => ClientStatus::Ongoing,
            ClientStatus::Ongoing => ClientStatus::Closed,
            ClientStatus::Closed => ClientStatus::Started,
        }
    }
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClientStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError(format!("unknown client status `{s}`")))
    }
}

impl TryFrom<String> for ClientStatus {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub first_visit: Option<NaiveDate>,
    pub next_visit: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub phone: Option<String>,
    pub location: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ClientStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct NewClient {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_visit: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_visit: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub status: ClientStatus,
}

impl NewClient {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut problems = Vec::new();
        require(&mut problems, "name", &self.name);
        check_amount(&mut problems, self.amount);

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::failed("Client", problems))
        }
    }
}

/// Body of an update request; `None` leaves the stored value untouched.
/// The optional fields are clearable: `Some(None)` (a JSON `null`)
/// removes the stored value.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        deserialize_with = "super::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub first_visit: Option<Option<NaiveDate>>,
    #[serde(
        deserialize_with = "super::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_visit: Option<Option<NaiveDate>>,
    #[serde(
        deserialize_with = "super::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<Option<f64>>,
    #[serde(
        deserialize_with = "super::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<Option<String>>,
    #[serde(
        deserialize_with = "super::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub location: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ClientStatus>,
}

impl ClientPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut problems = Vec::new();
        require_if_present(&mut problems, "name", self.name.as_deref());
        check_amount(&mut problems, self.amount.flatten());

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::failed("Client", problems))
        }
    }

    pub fn apply_to(&self, client: &mut Client) {
        if let Some(name) = &self.name {
            client.name = name.clone();
        }
        if let Some(first_visit) = self.first_visit {
            client.first_visit = first_visit;
        }
        if let Some(next_visit) = self.next_visit {
            client.next_visit = next_visit;
        }
        if let Some(amount) = self.amount {
            client.amount = amount;
        }
        if let Some(phone) = &self.phone {
            client.phone = phone.clone();
        }
        if let Some(location) = &self.location {
            client.location = location.clone();
        }
        if let Some(status) = self.status {
            client.status = status;
        }
    }
}

fn check_amount(problems: &mut Vec<String>, amount: Option<f64>) {
    if let Some(amount) = amount {
        if !amount.is_finite() || amount < 0.0 {
            problems.push("amount must be a non-negative number".to_string());
        }
    }
}

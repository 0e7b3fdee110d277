//! Decoding of backend search responses.
//!
//! The backend does not use one envelope for every endpoint. Search answers
//! come back as a tagged result list, as separate shipper/trucker lists, as a
//! bare array, or wrapped in `data`, and failures carry `message` or `error`.
//! Everything is normalised here so callers only ever see
//! `Result<Vec<SearchResult>, ApiFailure>`.

use crate::types::{EntityKind, SearchResult};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// A search request the backend rejected or that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    /// HTTP status, when the failure came from a response.
    pub status: Option<u16>,
    /// Message supplied by the backend, if any.
    pub message: Option<String>,
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.message, self.status) {
            (Some(message), _) => f.write_str(message),
            (None, Some(status)) => write!(f, "request failed with status {status}"),
            (None, None) => f.write_str("request failed"),
        }
    }
}

impl std::error::Error for ApiFailure {}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope {
    Wrapped {
        data: Box<Envelope>,
        #[serde(default)]
        success: Option<bool>,
        #[serde(default)]
        message: Option<String>,
    },
    Tagged {
        results: Vec<serde_json::Value>,
    },
    List(Vec<serde_json::Value>),
    Grouped {
        shippers: Vec<serde_json::Value>,
        #[serde(default)]
        truckers: Vec<serde_json::Value>,
    },
    TruckersOnly {
        truckers: Vec<serde_json::Value>,
    },
    Failure {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        error: Option<serde_json::Value>,
        #[serde(default, rename = "results")]
        _results: Absent,
        #[serde(default, rename = "shippers")]
        _shippers: Absent,
        #[serde(default, rename = "truckers")]
        _truckers: Absent,
    },
}

/// A key that must not be present. Keeps malformed result lists from being
/// read as a failure body.
#[derive(Debug, Default)]
struct Absent;

impl<'de> Deserialize<'de> for Absent {
    fn deserialize<D>(_: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Err(serde::de::Error::custom("unexpected result list"))
    }
}

/// One record as the backend sends it. Every spelling the backend uses is a
/// separate field so records carrying two of them still decode.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default, deserialize_with = "flexible_id")]
    id: Option<u64>,
    #[serde(default, rename = "_id", deserialize_with = "flexible_id")]
    object_id: Option<u64>,
    #[serde(
        default,
        rename = "entityKind",
        alias = "type",
        alias = "kind",
        alias = "entity_kind",
        deserialize_with = "lenient_kind"
    )]
    entity_kind: Option<EntityKind>,
    #[serde(default, rename = "displayName", alias = "display_name")]
    display_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "fullName")]
    full_name: Option<String>,
    #[serde(default, rename = "secondaryLabel", alias = "secondary_label")]
    secondary_label: Option<String>,
    #[serde(default, rename = "companyName")]
    company_name: Option<String>,
    #[serde(default, rename = "transportName")]
    transport_name: Option<String>,
    #[serde(default, rename = "uniqueId", alias = "unique_id")]
    unique_id: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    mobile: Option<String>,
}

/// Numbers or numeric strings; anything else reads as no id.
fn flexible_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Kinds outside the closed set read as missing.
fn lenient_kind<'de, D>(deserializer: D) -> Result<Option<EntityKind>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(serde_json::from_value(serde_json::Value::deserialize(deserializer)?).ok())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl RawRecord {
    fn into_result(self, group: Option<EntityKind>) -> Option<SearchResult> {
        let Some(id) = self.id.or(self.object_id) else {
            tracing::warn!("Dropping search record without a numeric id");
            return None;
        };
        let Some(entity_kind) = group.or(self.entity_kind) else {
            tracing::warn!("Dropping search record {} without an entity kind", id);
            return None;
        };

        let secondary_label = non_blank(self.secondary_label)
            .or_else(|| non_blank(self.company_name))
            .or_else(|| non_blank(self.transport_name));
        let unique_id = non_blank(self.unique_id);
        let display_name = non_blank(self.display_name)
            .or_else(|| non_blank(self.name))
            .or_else(|| non_blank(self.full_name))
            .or_else(|| secondary_label.clone())
            .or_else(|| unique_id.clone())
            .unwrap_or_else(|| format!("{} #{}", entity_kind, id));

        Some(SearchResult {
            id,
            entity_kind,
            display_name,
            secondary_label,
            unique_id,
            email: non_blank(self.email),
            phone: non_blank(self.phone).or_else(|| non_blank(self.mobile)),
        })
    }
}

/// Decode records one at a time; a bad record is skipped, not fatal.
fn collect(records: Vec<serde_json::Value>, group: Option<EntityKind>) -> Vec<SearchResult> {
    records
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<RawRecord>(value) {
            Ok(record) => record.into_result(group),
            Err(e) => {
                tracing::warn!("Dropping undecodable search record: {}", e);
                None
            }
        })
        .collect()
}

fn error_text(error: serde_json::Value) -> Option<String> {
    match error {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Object(mut map) => match map.remove("message") {
            Some(serde_json::Value::String(s)) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

impl Envelope {
    /// Message carried by the envelope, wherever the backend put it.
    fn message(&self) -> Option<String> {
        match self {
            Envelope::Wrapped { message, data, .. } => message.clone().or_else(|| data.message()),
            Envelope::Failure { message, error, .. } => message
                .clone()
                .or_else(|| error.clone().and_then(error_text)),
            _ => None,
        }
    }

    fn into_results(self) -> Result<Vec<SearchResult>, Option<String>> {
        match self {
            Envelope::Wrapped {
                success: Some(false),
                message,
                data,
            } => Err(message.or_else(|| data.message())),
            Envelope::Wrapped { data, .. } => data.into_results(),
            Envelope::Tagged { results } => Ok(collect(results, None)),
            Envelope::List(records) => Ok(collect(records, None)),
            Envelope::Grouped { shippers, truckers } => {
                let mut results = collect(shippers, Some(EntityKind::Shipper));
                results.extend(collect(truckers, Some(EntityKind::Trucker)));
                Ok(results)
            }
            Envelope::TruckersOnly { truckers } => Ok(collect(truckers, Some(EntityKind::Trucker))),
            failure @ Envelope::Failure { .. } => Err(failure.message()),
        }
    }
}

/// Normalise a search response body into typed results.
///
/// A 2xx status with a recognised result shape yields `Ok`. Anything else is
/// an `ApiFailure` carrying the backend's message when one can be found.
pub fn decode_search_response(status: u16, body: &str) -> Result<Vec<SearchResult>, ApiFailure> {
    let success = (200..300).contains(&status);

    let envelope: Envelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!("Undecodable search response (status {}): {}", status, e);
            return Err(ApiFailure {
                status: Some(status),
                message: None,
            });
        }
    };

    if !success {
        return Err(ApiFailure {
            status: Some(status),
            message: non_blank(envelope.message()),
        });
    }

    envelope.into_results().map_err(|message| ApiFailure {
        status: Some(status),
        message: non_blank(message),
    })
}

//! Search result types shared by the controller and its consumers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The record type behind a search result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[serde(alias = "Shipper", alias = "SHIPPER")]
    Shipper,
    #[serde(alias = "Trucker", alias = "TRUCKER")]
    Trucker,
}

impl EntityKind {
    /// Dashboard route for a record of this kind.
    pub fn route(self, id: u64) -> String {
        match self {
            EntityKind::Shipper => format!("/shippers/{id}"),
            EntityKind::Trucker => format!("/truckers/{id}"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Shipper => "shipper",
            EntityKind::Trucker => "trucker",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One matched shipper or trucker.
///
/// `id` is only unique within `entity_kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: u64,
    pub entity_kind: EntityKind,
    pub display_name: String,
    /// Company name for shippers, transport name for truckers.
    #[serde(default)]
    pub secondary_label: Option<String>,
    /// External business identifier.
    #[serde(default)]
    pub unique_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl SearchResult {
    /// Dashboard route this result navigates to.
    pub fn route(&self) -> String {
        self.entity_kind.route(self.id)
    }
}

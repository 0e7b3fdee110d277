//! Observable state of a query controller.

use haulboard_core::SearchResult;

/// What the search surface should show right now.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum QueryState {
    /// No query, or the query was cleared.
    #[default]
    Idle,
    /// A lookup has been issued and has not settled.
    Loading,
    /// The latest lookup succeeded.
    Success(Vec<SearchResult>),
    /// The latest lookup failed.
    Error(String),
}

impl QueryState {
    /// Results to display; empty for every state but `Success`.
    pub fn results(&self) -> &[SearchResult] {
        match self {
            QueryState::Success(results) => results,
            _ => &[],
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, QueryState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            QueryState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Short name used in logs and the CLI.
    pub fn label(&self) -> &'static str {
        match self {
            QueryState::Idle => "idle",
            QueryState::Loading => "loading",
            QueryState::Success(_) => "success",
            QueryState::Error(_) => "error",
        }
    }
}

//! haulboard-search: Debounced, sequence-gated search over shippers and truckers.

pub mod cache;
pub mod controller;
pub mod lookup;
pub mod state;

pub use controller::QueryController;
pub use lookup::{HttpLookup, LookupError, LookupService, FALLBACK_MESSAGE};
pub use state::QueryState;

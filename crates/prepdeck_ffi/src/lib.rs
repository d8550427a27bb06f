//! Flutter-facing bindings for the PrepDeck client core.

pub mod api;

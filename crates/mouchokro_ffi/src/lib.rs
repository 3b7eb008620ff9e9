//! Flutter-facing bindings for the Mouchokro board core.

pub mod api;

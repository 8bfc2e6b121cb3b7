//! Flutter-facing bridge over `fitguide_core`.

pub mod api;

//! Flutter-facing bindings over `taskboard_core`.
//!
//! Generated FRB glue is produced by `flutter_rust_bridge_codegen` and is
//! not checked in.

pub mod api;

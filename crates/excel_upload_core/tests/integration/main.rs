//! Single integration test binary (tests/integration/main.rs): all integration tests as modules.
//! Shared common code is compiled once, so no dead_code from per-binary subsets.
//!
//! Run: `cargo test --test integration`
//! Filter by module: `cargo test --test integration upload::`

mod common;
mod file_selection;
mod initialization;

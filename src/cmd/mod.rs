// ============================================================================
// src/cmd/mod.rs – command subsystem root
// ============================================================================
pub mod derive; // pbkdf2_forge derive
pub mod layout; // pbkdf2_forge layout
pub mod selftest; // pbkdf2_forge self-test

pub use derive::{run_derive, DeriveArgs};
pub use layout::{run_layout, LayoutArgs};
pub use selftest::run_self_test;

//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `flowbit_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    // Tiny probe to validate core crate wiring independently from the
    // FFI/widget runtime setup.
    println!("flowbit_core ping={}", flowbit_core::ping());
    println!("flowbit_core version={}", flowbit_core::core_version());
}

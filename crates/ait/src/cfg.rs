//! Fixed defaults shared across modules.
//!
//! Policy
//! - Values here are the contract, not tunables. Per-call knobs live in the
//!   `*Cfg` structs of the owning module.

/// Lower clip bound applied by `save_png`.
pub const PIXEL_MIN: f64 = 0.0;
/// Upper clip bound applied by `save_png`.
pub const PIXEL_MAX: f64 = 255.0;
/// Rename template used by `unique_name` / `unique_names`.
pub const DEFAULT_NAME_PATTERN: &str = "{name}_{i}";

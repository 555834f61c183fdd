//! The two pattern scans. Both are pure functions over a bar slice; neither
//! reads the other's output, so they can run in any order.

mod imbalance;
mod structure;

pub use imbalance::detect_imbalances;
pub use structure::{DEFAULT_WINDOW, detect_structure_breaks};

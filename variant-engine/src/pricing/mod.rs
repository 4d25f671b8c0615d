//! Variant pricing
//!
//! Sums option contributions over a base price/weight. Arithmetic happens in
//! `rust_decimal`; results are rounded to 2 places half away from zero
//! before they are stored as `f64`.

mod calculator;

pub use calculator::*;

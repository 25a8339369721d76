//! Ambient background animation: decorative bubbles spawned on a fixed cadence
//! and expired after a fixed lifetime. Never reads or writes form state.

pub mod driver;
pub mod field;

pub use driver::{AmbientDriver, AmbientEvent, AmbientSettings};
pub use field::BubbleField;

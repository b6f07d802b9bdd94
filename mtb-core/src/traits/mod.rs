//! Abstract interfaces for the MTB format
//!
//! This module defines the trait abstractions shared by the codec and the
//! I/O layer.

pub mod element;
pub mod sink;

pub use element::{Complex, MatrixElement, Pattern};
pub use sink::TripletSink;

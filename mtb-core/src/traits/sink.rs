//! Destination abstraction for decoded or parsed triplets
//!
//! The text tokenizer pushes triplets into a sink without knowing whether
//! they end up encoded on disk or collected in memory.

use crate::Triplet;

/// Trait for consumers of a stream of triplets
pub trait TripletSink<T> {
    /// Error raised when the sink cannot accept a triplet
    type Error;

    /// Accept one triplet
    fn push(&mut self, triplet: Triplet<T>) -> Result<(), Self::Error>;
}

#[cfg(feature = "alloc")]
impl<T> TripletSink<T> for alloc::vec::Vec<Triplet<T>> {
    type Error = core::convert::Infallible;

    fn push(&mut self, triplet: Triplet<T>) -> Result<(), Self::Error> {
        alloc::vec::Vec::push(self, triplet);
        Ok(())
    }
}

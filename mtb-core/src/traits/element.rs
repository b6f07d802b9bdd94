//! Matrix element type constraints for the MTB format
//!
//! This module defines the trait that constrains what types can be
//! decoded from or encoded into MTB records, plus the two value types
//! the format needs beyond primitives: [`Complex`] and [`Pattern`].

use crate::format::Datatype;

/// A complex number stored as consecutive real and imaginary parts
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Complex<T> {
    pub re: T,
    pub im: T,
}

impl<T> Complex<T> {
    pub const fn new(re: T, im: T) -> Self {
        Self { re, im }
    }
}

impl<T: core::fmt::Display + PartialOrd + Default + Copy> core::fmt::Display for Complex<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.im < T::default() {
            write!(f, "{}{}i", self.re, self.im)
        } else {
            write!(f, "{}+{}i", self.re, self.im)
        }
    }
}

/// Value of an entry in a pattern matrix
///
/// Pattern matrices store structure only; every entry is implicitly one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pattern;

impl core::fmt::Display for Pattern {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "1")
    }
}

/// Trait for types that can be stored as matrix elements
///
/// Elements convert from the three stored value kinds on decode and project
/// into them on encode. The record codec picks the conversion from the
/// [`ValueEncoding`](crate::format::ValueEncoding) of the file, so one element
/// type can read any datatype it can represent.
pub trait MatrixElement: Copy + PartialEq + core::fmt::Debug + Send + Sync + 'static {
    /// The datatype this element naturally maps to
    fn datatype() -> Datatype;

    /// The multiplicative identity, used for pattern entries
    fn one() -> Self;

    /// Convert from a stored integer
    fn from_integer(value: i64) -> Self;

    /// Convert from a stored real
    fn from_real(value: f64) -> Self;

    /// Convert from a stored complex value
    ///
    /// Returns `None` when the element cannot hold an imaginary part.
    fn from_complex(value: Complex<f64>) -> Option<Self>;

    /// Project to an integer for encoding
    fn to_integer(self) -> i64;

    /// Project to a real for encoding
    fn to_real(self) -> f64;

    /// Project to a complex value for encoding
    fn to_complex(self) -> Complex<f64> {
        Complex::new(self.to_real(), 0.0)
    }
}

/// Implement MatrixElement for primitive numeric types
macro_rules! impl_matrix_element {
    ($type:ty, $datatype:ident) => {
        impl MatrixElement for $type {
            fn datatype() -> Datatype {
                Datatype::$datatype
            }

            fn one() -> Self {
                1 as $type
            }

            fn from_integer(value: i64) -> Self {
                value as $type
            }

            fn from_real(value: f64) -> Self {
                value as $type
            }

            fn from_complex(_value: Complex<f64>) -> Option<Self> {
                None
            }

            fn to_integer(self) -> i64 {
                self as i64
            }

            fn to_real(self) -> f64 {
                self as f64
            }
        }
    };
}

impl_matrix_element!(i32, Integer);
impl_matrix_element!(i64, Integer);
impl_matrix_element!(f32, Real);
impl_matrix_element!(f64, Real);

macro_rules! impl_complex_element {
    ($type:ty) => {
        impl MatrixElement for Complex<$type> {
            fn datatype() -> Datatype {
                Datatype::Complex
            }

            fn one() -> Self {
                Complex::new(1.0, 0.0)
            }

            fn from_integer(value: i64) -> Self {
                Complex::new(value as $type, 0.0)
            }

            fn from_real(value: f64) -> Self {
                Complex::new(value as $type, 0.0)
            }

            fn from_complex(value: Complex<f64>) -> Option<Self> {
                Some(Complex::new(value.re as $type, value.im as $type))
            }

            fn to_integer(self) -> i64 {
                self.re as i64
            }

            fn to_real(self) -> f64 {
                self.re as f64
            }

            fn to_complex(self) -> Complex<f64> {
                Complex::new(self.re as f64, self.im as f64)
            }
        }
    };
}

impl_complex_element!(f32);
impl_complex_element!(f64);

impl MatrixElement for Pattern {
    fn datatype() -> Datatype {
        Datatype::Pattern
    }

    fn one() -> Self {
        Pattern
    }

    fn from_integer(_value: i64) -> Self {
        Pattern
    }

    fn from_real(_value: f64) -> Self {
        Pattern
    }

    fn from_complex(_value: Complex<f64>) -> Option<Self> {
        Some(Pattern)
    }

    fn to_integer(self) -> i64 {
        1
    }

    fn to_real(self) -> f64 {
        1.0
    }
}

//! Value operators: the monoid (identity + associative combine) used to sum
//! report values without tying the engine to one numeric representation.

pub mod decimal;
pub mod registry;

use std::sync::Arc;

pub use decimal::{DecimalConfig, DecimalOperator, RoundingMode};
pub use registry::{operator_of, OperatorRegistry};

/// Identity element plus an associative, total `combine`.
///
/// Implementations must satisfy `combine(identity(), x) == x` and
/// `combine(x, identity()) == x` for every `x`. Commutativity is not required,
/// so callers fold in insertion order.
pub trait ValueOperator<T>: Send + Sync {
    fn identity(&self) -> T;
    fn combine(&self, a: T, b: T) -> T;
}

impl<T, O> ValueOperator<T> for Arc<O>
where
    O: ValueOperator<T> + ?Sized,
{
    fn identity(&self) -> T {
        (**self).identity()
    }

    fn combine(&self, a: T, b: T) -> T {
        (**self).combine(a, b)
    }
}

/// Folds `values` left to right, starting from the operator's identity.
pub fn sum_with<T, O, I>(operator: &O, values: I) -> T
where
    O: ValueOperator<T> + ?Sized,
    I: IntoIterator<Item = T>,
{
    values
        .into_iter()
        .fold(operator.identity(), |acc, value| operator.combine(acc, value))
}

/// `i32` addition. Overflow wraps so `combine` stays total.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IntOperator;

impl ValueOperator<i32> for IntOperator {
    fn identity(&self) -> i32 {
        0
    }

    fn combine(&self, a: i32, b: i32) -> i32 {
        a.wrapping_add(b)
    }
}

/// `i64` addition. Overflow wraps so `combine` stays total.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LongOperator;

impl ValueOperator<i64> for LongOperator {
    fn identity(&self) -> i64 {
        0
    }

    fn combine(&self, a: i64, b: i64) -> i64 {
        a.wrapping_add(b)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FloatOperator;

impl ValueOperator<f32> for FloatOperator {
    fn identity(&self) -> f32 {
        0.0
    }

    fn combine(&self, a: f32, b: f32) -> f32 {
        a + b
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DoubleOperator;

impl ValueOperator<f64> for DoubleOperator {
    fn identity(&self) -> f64 {
        0.0
    }

    fn combine(&self, a: f64, b: f64) -> f64 {
        a + b
    }
}

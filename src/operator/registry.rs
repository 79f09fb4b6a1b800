use std::{
    any::{type_name, Any, TypeId},
    collections::HashMap,
    sync::Arc,
};

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rust_decimal::Decimal;

use super::{DecimalOperator, DoubleOperator, FloatOperator, IntOperator, LongOperator, ValueOperator};
use crate::errors::ReportError;

static GLOBAL: Lazy<RwLock<OperatorRegistry>> =
    Lazy::new(|| RwLock::new(OperatorRegistry::with_builtins()));

struct Registration {
    type_name: &'static str,
    // Always an `Arc<dyn ValueOperator<T>>` for the `T` named by the map key.
    operator: Box<dyn Any + Send + Sync>,
}

/// Maps a value type to the operator that sums it.
///
/// Generic code should take an operator directly; the registry exists for
/// boundaries where the value type is only chosen at runtime.
#[derive(Default)]
pub struct OperatorRegistry {
    entries: HashMap<TypeId, Registration>,
}

impl OperatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with `i32`, `i64`, `f32`, `f64` and `Decimal`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register::<i32, _>(IntOperator);
        registry.register::<i64, _>(LongOperator);
        registry.register::<f32, _>(FloatOperator);
        registry.register::<f64, _>(DoubleOperator);
        registry.register::<Decimal, _>(DecimalOperator::default());
        registry
    }

    /// Process-wide registry, initialised with the builtin operators.
    pub fn global() -> &'static RwLock<OperatorRegistry> {
        &GLOBAL
    }

    /// Registers (or replaces) the operator used for values of type `T`.
    pub fn register<T, O>(&mut self, operator: O)
    where
        T: 'static,
        O: ValueOperator<T> + 'static,
    {
        let shared: Arc<dyn ValueOperator<T>> = Arc::new(operator);
        let replaced = self
            .entries
            .insert(
                TypeId::of::<T>(),
                Registration {
                    type_name: type_name::<T>(),
                    operator: Box::new(shared),
                },
            )
            .is_some();
        tracing::debug!(value_type = type_name::<T>(), replaced, "registered value operator");
    }

    /// Looks up the operator for `T`.
    pub fn get<T: 'static>(&self) -> Result<Arc<dyn ValueOperator<T>>, ReportError> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| {
                entry
                    .operator
                    .downcast_ref::<Arc<dyn ValueOperator<T>>>()
                    .cloned()
            })
            .ok_or_else(|| ReportError::UnregisteredType(type_name::<T>().to_string()))
    }

    pub fn is_registered<T: 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Names of every registered value type, sorted.
    pub fn registered_types(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.values().map(|entry| entry.type_name).collect();
        names.sort_unstable();
        names
    }
}

/// Resolves the operator for `T` from the global registry.
pub fn operator_of<T: 'static>() -> Result<Arc<dyn ValueOperator<T>>, ReportError> {
    OperatorRegistry::global().read().get::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Cents(i64);

    struct CentsOperator;

    impl ValueOperator<Cents> for CentsOperator {
        fn identity(&self) -> Cents {
            Cents(0)
        }

        fn combine(&self, a: Cents, b: Cents) -> Cents {
            Cents(a.0 + b.0)
        }
    }

    #[test]
    fn builtins_are_available() {
        let registry = OperatorRegistry::with_builtins();
        assert!(registry.is_registered::<i32>());
        assert!(registry.is_registered::<Decimal>());
        assert_eq!(registry.get::<i64>().unwrap().combine(40, 2), 42);
        assert_eq!(registry.registered_types().len(), 5);
    }

    #[test]
    fn unregistered_type_names_the_missing_type() {
        let registry = OperatorRegistry::with_builtins();
        let err = registry
            .get::<Cents>()
            .err()
            .expect("lookup must fail before registration");
        let message = err.to_string();
        assert!(message.contains("Cents"), "unexpected error: {message}");
        assert!(matches!(err, ReportError::UnregisteredType(_)));
    }

    #[test]
    fn third_party_types_can_register() {
        let mut registry = OperatorRegistry::new();
        registry.register::<Cents, _>(CentsOperator);
        let op = registry.get::<Cents>().expect("registered");
        assert_eq!(op.combine(Cents(150), Cents(250)), Cents(400));
    }

    #[test]
    fn global_lookup_resolves_builtins() {
        let op = operator_of::<f64>().expect("f64 is builtin");
        assert_eq!(op.combine(1.5, 2.0), 3.5);
    }
}

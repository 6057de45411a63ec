//! Solver variables.
//!
//! A [`Variable`] is a cheap, clonable handle to a shared cell. Clones refer
//! to the same cell, and equality and hashing follow the cell's identity,
//! never its name or value. The solver writes solved values back into the
//! cell on `update_variables`.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Opaque user payload attached to a variable. The solver never reads it.
pub type Context = Arc<dyn Any + Send + Sync>;

struct VariableData {
    name: RwLock<String>,
    /// Bit pattern of the current `f64` value.
    value: AtomicU64,
    context: RwLock<Option<Context>>,
}

/// A variable of the linear system.
#[derive(Clone)]
pub struct Variable(Arc<VariableData>);

impl Variable {
    /// Create an unnamed variable with value `0.0`.
    pub fn new() -> Self {
        Self::named("")
    }

    /// Create a named variable with value `0.0`.
    pub fn named(name: impl Into<String>) -> Self {
        Self(Arc::new(VariableData {
            name: RwLock::new(name.into()),
            value: AtomicU64::new(0.0f64.to_bits()),
            context: RwLock::new(None),
        }))
    }

    /// Create a named variable carrying a user context.
    pub fn with_context(name: impl Into<String>, context: Context) -> Self {
        let var = Self::named(name);
        var.set_context(Some(context));
        var
    }

    pub fn name(&self) -> String {
        self.0
            .name
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        *self.0.name.write().unwrap_or_else(PoisonError::into_inner) = name.into();
    }

    /// The last value written by the solver (or by [`Variable::set_value`]).
    pub fn value(&self) -> f64 {
        f64::from_bits(self.0.value.load(Ordering::Acquire))
    }

    pub fn set_value(&self, value: f64) {
        self.0.value.store(value.to_bits(), Ordering::Release);
    }

    pub fn context(&self) -> Option<Context> {
        self.0
            .context
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_context(&self, context: Option<Context>) {
        *self.0.context.write().unwrap_or_else(PoisonError::into_inner) = context;
    }

    /// Check whether two handles refer to the same variable.
    pub fn is(&self, other: &Variable) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn address(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl Default for Variable {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.is(other)
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("name", &self.name())
            .field("value", &self.value())
            .finish()
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_variable_methods() {
        let v = Variable::new();
        assert_eq!(v.name(), "");
        v.set_name("γ");
        assert_eq!(v.name(), "γ");
        v.set_name("foo");
        assert_eq!(v.name(), "foo");
        assert_eq!(v.value(), 0.0);
        assert_eq!(v.to_string(), "foo");
    }

    #[test]
    fn test_identity_equality() {
        let a = Variable::named("x");
        let b = Variable::named("x");
        let a2 = a.clone();
        assert_ne!(a, b);
        assert_eq!(a, a2);

        a2.set_value(3.5);
        assert_eq!(a.value(), 3.5);
        assert_eq!(b.value(), 0.0);

        let set: HashSet<Variable> = [a.clone(), a2, b].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_context() {
        let v = Variable::named("foo");
        assert!(v.context().is_none());

        let ctx: Context = Arc::new(42u32);
        v.set_context(Some(ctx.clone()));
        let stored = v.context().unwrap();
        assert!(Arc::ptr_eq(&stored, &ctx));
        assert_eq!(stored.downcast_ref::<u32>(), Some(&42));

        v.set_context(None);
        assert!(v.context().is_none());

        let w = Variable::with_context("bar", Arc::new("payload"));
        assert_eq!(w.context().unwrap().downcast_ref::<&str>(), Some(&"payload"));
    }
}

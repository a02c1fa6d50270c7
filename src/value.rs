//! Type-erased panel results.

use std::any::{Any, type_name};
use std::fmt;
use std::rc::Rc;

/// A panel's result value with its concrete type erased.
///
/// Every future awaiting a controller observes the same value, so the payload
/// is reference counted. Typed access goes through the `downcast*` accessors,
/// which return `None`/`Err` on a type mismatch instead of panicking.
#[derive(Clone)]
pub struct PanelValue {
    inner: Rc<dyn Any>,
    type_name: &'static str,
}

impl PanelValue {
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            inner: Rc::new(value),
            type_name: type_name::<T>(),
        }
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    pub fn downcast<T: Any + Clone>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }

    /// Take the shared payload as a typed `Rc`, handing the value back on mismatch.
    pub fn into_rc<T: Any>(self) -> Result<Rc<T>, Self> {
        let type_name = self.type_name;
        self.inner
            .downcast::<T>()
            .map_err(|inner| Self { inner, type_name })
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for PanelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelValue")
            .field("type", &self.type_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_type_is_none_not_panic() {
        let v = PanelValue::new(String::from("x"));
        assert!(v.is::<String>());
        assert_eq!(v.downcast::<String>().as_deref(), Some("x"));
        assert!(v.downcast::<u32>().is_none());
    }

    #[test]
    fn into_rc_returns_value_on_mismatch() {
        let v = PanelValue::new(7u8);
        let back = v.into_rc::<String>().unwrap_err();
        assert_eq!(back.type_name(), "u8");
        assert_eq!(*back.into_rc::<u8>().unwrap(), 7);
    }
}

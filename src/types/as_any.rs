//! Upcasting to `Any` for trait objects.

use std::any::Any;

/// Access to the concrete value behind a trait object.
///
/// Implemented for every `'static` type, so page and object traits can list
/// it as a supertrait and downcast without per-type boilerplate. Call it on
/// the trait object itself (`(*boxed).as_any()`), not on a `Box` or `Arc`,
/// or the smart pointer's own impl is picked.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

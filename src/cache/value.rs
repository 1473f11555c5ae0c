//! Cache Value Module
//!
//! Type-erased payloads and the numeric deltas accepted by `increment`.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

// == Cache Value ==
/// A stored payload of any `Send + Sync + 'static` type.
///
/// Cloning is cheap: the payload sits behind an `Arc`, so values handed out
/// by `get` share storage with the entry until it is overwritten.
#[derive(Clone)]
pub struct CacheValue {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl CacheValue {
    // == Constructor ==
    /// Wraps a value for storage.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Name of the stored type, as reported by [`std::any::type_name`].
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns true if the payload is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        (*self.inner).is::<T>()
    }

    /// Borrows the payload as a `T`, if that is its type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.inner).downcast_ref::<T>()
    }

    /// Returns true if both handles point at the same stored payload.
    pub fn ptr_eq(&self, other: &CacheValue) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // == Increment ==
    /// Adds `delta` to a numeric payload, returning the new value.
    ///
    /// The delta is cast to the stored type first, so the result always has
    /// the same type as `self`. Integers wrap on overflow. Returns `None` for
    /// non-numeric payloads.
    pub(crate) fn incremented(&self, delta: Delta) -> Option<CacheValue> {
        macro_rules! add_wrapping {
            ($($t:ty),*) => {
                $(
                    if let Some(current) = self.downcast_ref::<$t>() {
                        return Some(CacheValue::new(current.wrapping_add(delta.cast::<$t>())));
                    }
                )*
            };
        }
        macro_rules! add_float {
            ($($t:ty),*) => {
                $(
                    if let Some(current) = self.downcast_ref::<$t>() {
                        return Some(CacheValue::new(*current + delta.cast::<$t>()));
                    }
                )*
            };
        }

        add_wrapping!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
        add_float!(f32, f64);
        None
    }
}

impl fmt::Debug for CacheValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheValue")
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}

// == Delta ==
/// Amount passed to `increment`.
///
/// Built from any primitive number via `From`, so non-numeric deltas are
/// rejected at compile time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Delta {
    Int(i128),
    UInt(u128),
    Float(f64),
}

/// Lossy `as` conversion from a delta into one stored numeric type.
pub(crate) trait FromDelta {
    fn from_delta(delta: Delta) -> Self;
}

macro_rules! impl_from_delta {
    ($($t:ty),*) => {
        $(
            impl FromDelta for $t {
                fn from_delta(delta: Delta) -> Self {
                    match delta {
                        Delta::Int(n) => n as $t,
                        Delta::UInt(n) => n as $t,
                        Delta::Float(n) => n as $t,
                    }
                }
            }
        )*
    };
}

impl_from_delta!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl Delta {
    fn cast<T: FromDelta>(self) -> T {
        T::from_delta(self)
    }
}

macro_rules! impl_delta_from {
    ($variant:ident as $wide:ty: $($t:ty),*) => {
        $(
            impl From<$t> for Delta {
                fn from(n: $t) -> Self {
                    Delta::$variant(n as $wide)
                }
            }
        )*
    };
}

impl_delta_from!(Int as i128: i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);
impl_delta_from!(UInt as u128: u128);
impl_delta_from!(Float as f64: f32, f64);

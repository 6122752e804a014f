//! Stored Values
//!
//! The store only keeps *handles* to caller-owned data. A value is accepted
//! when it is pointer-like, slice-like or map-like; every one of those kinds
//! wraps an `Arc`, so a later `get` hands back the same allocation the caller
//! stored and interior mutation through it is visible to every reader.
//!
//! Scalars still have a tag of their own so that callers passing a bare
//! number or string get a clear `UnsupportedType` error instead of a silent
//! copy.
//!
//! ```
//! use refstore::Value;
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! let session = Value::pointer(Arc::new(String::from("user-42")));
//! let codes = Value::slice(Arc::new(vec![1u32, 2, 3]));
//! let attrs = Value::map(Arc::new(HashMap::from([("role", "admin")])));
//!
//! assert!(session.is_reference());
//! assert!(codes.is_reference());
//! assert!(attrs.is_reference());
//! assert!(!Value::from(10i64).is_reference());
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Type-erased shared handle held by reference values.
pub type Handle = Arc<dyn Any + Send + Sync>;

/// A value handed to or returned from the store.
#[derive(Clone)]
pub enum Value {
    /// No value. Rejected by `set` with `InvalidValue`.
    Nil,

    /// A shared pointer to a single object.
    Pointer(Handle),

    /// A shared sequence, created with [`Value::slice`].
    Slice(Handle),

    /// A shared map, created with [`Value::map`].
    Map(Handle),

    /// A plain copied value. Rejected by `set` with `UnsupportedType`.
    Scalar(Scalar),
}

/// Copied (non-reference) values.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
}

impl Scalar {
    /// Short name of the scalar kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Scalar::Bool(_) => "bool",
            Scalar::Int(_) => "integer",
            Scalar::UInt(_) => "unsigned integer",
            Scalar::Float(_) => "float",
            Scalar::Str(_) => "string",
        }
    }
}

impl Value {
    /// Wraps a shared pointer.
    pub fn pointer<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Value::Pointer(value)
    }

    /// Wraps a shared sequence.
    pub fn slice<T: Any + Send + Sync>(items: Arc<Vec<T>>) -> Self {
        Value::Slice(items)
    }

    /// Wraps a shared map.
    pub fn map<K, V>(map: Arc<HashMap<K, V>>) -> Self
    where
        K: Any + Send + Sync,
        V: Any + Send + Sync,
    {
        Value::Map(map)
    }

    /// Returns the name of this value's kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Pointer(_) => "pointer",
            Value::Slice(_) => "slice",
            Value::Map(_) => "map",
            Value::Scalar(s) => s.kind_name(),
        }
    }

    /// True for the kinds the store accepts.
    #[inline]
    pub fn is_reference(&self) -> bool {
        matches!(self, Value::Pointer(_) | Value::Slice(_) | Value::Map(_))
    }

    /// Returns the shared handle of a reference value.
    pub fn handle(&self) -> Option<&Handle> {
        match self {
            Value::Pointer(h) | Value::Slice(h) | Value::Map(h) => Some(h),
            Value::Nil | Value::Scalar(_) => None,
        }
    }

    /// Recovers the typed `Arc` behind a reference value.
    ///
    /// For slices ask for `Vec<T>`, for maps ask for `HashMap<K, V>`.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.handle()
            .and_then(|h| Arc::clone(h).downcast::<T>().ok())
    }

    /// True if both values are references to the same allocation.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self.handle(), other.handle()) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("Nil"),
            Value::Scalar(s) => f.debug_tuple("Scalar").field(s).finish(),
            Value::Pointer(h) | Value::Slice(h) | Value::Map(h) => f
                .debug_tuple(self.kind_name())
                .field(&Arc::as_ptr(h))
                .finish(),
        }
    }
}

impl<T: Any + Send + Sync> From<Arc<T>> for Value {
    fn from(value: Arc<T>) -> Self {
        Value::Pointer(value)
    }
}

impl<T: Any + Send + Sync> From<Option<Arc<T>>> for Value {
    fn from(value: Option<Arc<T>>) -> Self {
        value.map_or(Value::Nil, Value::from)
    }
}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident as $cast:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Scalar(Scalar::$variant(v as $cast))
                }
            }
        )*
    };
}

scalar_from! {
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    u8 => UInt as u64,
    u16 => UInt as u64,
    u32 => UInt as u64,
    u64 => UInt as u64,
    usize => UInt as u64,
    f32 => Float as f64,
    f64 => Float as f64,
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Scalar(Scalar::Bool(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Scalar(Scalar::Str(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Scalar(Scalar::Str(v.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct Person {
        name: String,
        age: u32,
    }

    #[test]
    fn test_reference_kinds() {
        assert!(Value::pointer(Arc::new(1u8)).is_reference());
        assert!(Value::slice(Arc::new(vec![1, 2, 3])).is_reference());
        assert!(Value::map(Arc::new(HashMap::from([("a", 1)]))).is_reference());
        assert!(!Value::Nil.is_reference());
        assert!(!Value::from("text").is_reference());
    }

    #[test]
    fn test_scalar_conversions() {
        assert_eq!(Value::from(10i64).kind_name(), "integer");
        assert_eq!(Value::from(10u32).kind_name(), "unsigned integer");
        assert_eq!(Value::from(1.5f64).kind_name(), "float");
        assert_eq!(Value::from(true).kind_name(), "bool");
        assert_eq!(Value::from(String::from("x")).kind_name(), "string");
    }

    #[test]
    fn test_option_conversion() {
        let none: Option<Arc<Person>> = None;
        assert!(matches!(Value::from(none), Value::Nil));

        let some = Some(Arc::new(Person {
            name: "Jack".into(),
            age: 18,
        }));
        assert!(matches!(Value::from(some), Value::Pointer(_)));
    }

    #[test]
    fn test_downcast() {
        let person = Arc::new(Person {
            name: "Jack".into(),
            age: 18,
        });
        let value = Value::from(Arc::clone(&person));

        let back = value.downcast::<Person>().unwrap();
        assert!(Arc::ptr_eq(&person, &back));
        assert_eq!(back.name, "Jack");
        assert_eq!(back.age, 18);

        assert!(value.downcast::<String>().is_none());
        assert!(Value::from(5i64).downcast::<i64>().is_none());
    }

    #[test]
    fn test_downcast_collections() {
        let slice = Value::slice(Arc::new(vec![1u32, 2, 3]));
        assert_eq!(*slice.downcast::<Vec<u32>>().unwrap(), vec![1, 2, 3]);

        let map = Value::map(Arc::new(HashMap::from([("a".to_string(), 1i32)])));
        let map = map.downcast::<HashMap<String, i32>>().unwrap();
        assert_eq!(map.get("a"), Some(&1));
    }

    #[test]
    fn test_shared_mutation_is_visible() {
        let counter = Arc::new(Mutex::new(0));
        let value = Value::pointer(Arc::clone(&counter));

        *counter.lock().unwrap() += 5;

        let seen = value.downcast::<Mutex<i32>>().unwrap();
        assert_eq!(*seen.lock().unwrap(), 5);
    }

    #[test]
    fn test_ptr_eq() {
        let a = Value::pointer(Arc::new(1u8));
        let b = a.clone();
        let c = Value::pointer(Arc::new(1u8));

        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
        assert!(!Value::Nil.ptr_eq(&Value::Nil));
    }
}

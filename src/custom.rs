//! Registry of user-supplied encoding functions.
//!
//! A custom type function takes over encoding for every value of the types it
//! is registered for. It receives the value's [`Value`] and returns the
//! strings to emit under the current namespace, or an error that is recorded
//! against that namespace. Traversal never descends into a value handled this
//! way.
//!
//! ## Examples
//!
//! ```rust
//! use form_encoder::{Encoder, Error, TypeKey};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Cents(i64);
//!
//! #[derive(Serialize)]
//! struct Order { total: Cents }
//!
//! let mut encoder = Encoder::new();
//! encoder.register_custom_type_func(
//!     |value| {
//!         let cents = value.as_i64().ok_or_else(|| Error::custom("not an amount"))?;
//!         Ok(vec![format!("{}.{:02}", cents / 100, cents % 100)])
//!     },
//!     [TypeKey::from("Cents")],
//! );
//!
//! let values = encoder.encode(&Order { total: Cents(1234) }).unwrap();
//! assert_eq!(values.get("total"), Some("12.34"));
//! ```

use crate::ser::to_value;
use crate::{Result, TypeKey, Value};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A function that encodes a value of one specific type.
pub type CustomTypeFunc = Arc<dyn Fn(&Value) -> Result<Vec<String>> + Send + Sync>;

/// Maps type identities to custom type functions.
///
/// Filled in while an encoder is being set up; read-only afterwards.
#[derive(Clone, Default)]
pub struct CustomTypeRegistry {
    funcs: HashMap<TypeKey, CustomTypeFunc>,
}

impl CustomTypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates `func` with each of `types`, replacing earlier registrations.
    pub fn register<F, I>(&mut self, func: F, types: I)
    where
        F: Fn(&Value) -> Result<Vec<String>> + Send + Sync + 'static,
        I: IntoIterator<Item = TypeKey>,
    {
        let func: CustomTypeFunc = Arc::new(func);
        for key in types {
            self.funcs.insert(key, Arc::clone(&func));
        }
    }

    #[must_use]
    pub fn lookup(&self, key: &TypeKey) -> Option<&CustomTypeFunc> {
        self.funcs.get(key)
    }

    /// Looks up the function for a value node, if the node has a type identity.
    pub(crate) fn for_value(&self, value: &Value) -> Option<&CustomTypeFunc> {
        if self.funcs.is_empty() {
            return None;
        }
        value.type_key().and_then(|key| self.funcs.get(&key))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }
}

impl fmt::Debug for CustomTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.funcs.keys()).finish()
    }
}

/// Returns the type identity of a sample value.
///
/// Handy for registering a function without spelling out the serde name.
///
/// # Examples
///
/// ```rust
/// use form_encoder::{type_key_of, TypeKey};
/// use serde::Serialize;
///
/// #[derive(Serialize, Default)]
/// struct Money(i64);
///
/// assert_eq!(type_key_of(&Money::default()).unwrap(), Some(TypeKey::Named("Money")));
/// assert_eq!(type_key_of(&5u8).unwrap(), None);
/// ```
///
/// # Errors
///
/// Returns an error if the sample's `Serialize` implementation fails.
pub fn type_key_of<T>(sample: &T) -> Result<Option<TypeKey>>
where
    T: ?Sized + Serialize,
{
    Ok(to_value(sample)?.resolve().0.type_key())
}

//! Serde helpers that mark `chrono::DateTime` fields as date/time values.
//!
//! serde erases `DateTime` into a plain string, so the encoder cannot tell it
//! apart from any other text. Fields routed through this module are wrapped in
//! a reserved newtype name. The form encoder turns them into
//! [`Value::DateTime`](crate::Value::DateTime), formats them as RFC 3339 with
//! whole seconds and lets a custom function registered for
//! [`TypeKey::DateTime`](crate::TypeKey::DateTime) take over. Every other
//! serializer sees the usual RFC 3339 string.
//!
//! ## Examples
//!
//! ```rust
//! use chrono::{DateTime, TimeZone, Utc};
//! use form_encoder::to_values;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Event {
//!     #[serde(with = "form_encoder::datetime")]
//!     at: DateTime<Utc>,
//!     #[serde(with = "form_encoder::datetime::option")]
//!     until: Option<DateTime<Utc>>,
//! }
//!
//! let event = Event {
//!     at: Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap(),
//!     until: None,
//! };
//! let values = to_values(&event).unwrap();
//! assert_eq!(values.get("at"), Some("2006-01-02T15:04:05Z"));
//! assert!(!values.contains_key("until"));
//! ```

use chrono::{DateTime, TimeZone};
use serde::{Serialize, Serializer};
use std::fmt;

/// Newtype name reserved for date/time values.
pub(crate) const DATETIME_NAME: &str = "$form_encoder::private::DateTime";

/// Serializes a `DateTime` as a form date/time value.
pub fn serialize<S, Tz>(dt: &DateTime<Tz>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    serializer.serialize_newtype_struct(DATETIME_NAME, &dt.to_rfc3339())
}

/// Same as the parent module, for `Option<DateTime<Tz>>`.
pub mod option {
    use super::Rfc3339;
    use chrono::{DateTime, TimeZone};
    use serde::Serializer;
    use std::fmt;

    pub fn serialize<S, Tz>(dt: &Option<DateTime<Tz>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        match dt {
            Some(dt) => serializer.serialize_some(&Rfc3339(dt)),
            None => serializer.serialize_none(),
        }
    }
}

struct Rfc3339<'a, Tz: TimeZone>(&'a DateTime<Tz>);

impl<Tz> Serialize for Rfc3339<'_, Tz>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize(self.0, serializer)
    }
}

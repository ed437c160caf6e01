//! Configuration options for form encoding.
//!
//! ## Examples
//!
//! ```rust
//! use form_encoder::{Encoder, EncoderOptions};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Inner { value: u8 }
//!
//! #[derive(Serialize)]
//! struct Outer { inner: Inner }
//!
//! let encoder = Encoder::with_options(EncoderOptions::new().with_separator('_'));
//! let values = encoder.encode(&Outer { inner: Inner { value: 1 } }).unwrap();
//! assert_eq!(values.get("inner_value"), Some("1"));
//! ```

/// Marker that excludes a field when used as its serialized key.
pub const DEFAULT_SKIP_MARKER: &str = "-";

/// Configuration for an [`Encoder`](crate::Encoder).
///
/// # Examples
///
/// ```rust
/// use form_encoder::EncoderOptions;
///
/// let options = EncoderOptions::new()
///     .with_separator('.')
///     .with_skip_marker("-")
///     .with_sorted_map_keys(true);
/// assert!(options.sort_map_keys);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct EncoderOptions {
    /// Joins a struct namespace and a field name.
    pub separator: char,
    /// A field serialized under this key is left out of the output.
    pub skip_marker: String,
    /// Visit map entries in ascending order of their encoded key instead of
    /// the map's own iteration order.
    pub sort_map_keys: bool,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        EncoderOptions {
            separator: '.',
            skip_marker: DEFAULT_SKIP_MARKER.to_string(),
            sort_map_keys: false,
        }
    }
}

impl EncoderOptions {
    /// Creates default options (`.` separator, `-` skip marker, map iteration order).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use form_encoder::EncoderOptions;
    ///
    /// let options = EncoderOptions::new();
    /// assert_eq!(options.separator, '.');
    /// assert_eq!(options.skip_marker, "-");
    /// assert!(!options.sort_map_keys);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Sets the key that marks a field as excluded.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use form_encoder::{Encoder, EncoderOptions};
    /// use serde::Serialize;
    ///
    /// #[derive(Serialize)]
    /// struct Login {
    ///     user: String,
    ///     #[serde(rename = "ignore")]
    ///     password: String,
    /// }
    ///
    /// let encoder = Encoder::with_options(EncoderOptions::new().with_skip_marker("ignore"));
    /// let login = Login { user: "a".into(), password: "b".into() };
    /// let values = encoder.encode(&login).unwrap();
    /// assert_eq!(values.len(), 1);
    /// ```
    #[must_use]
    pub fn with_skip_marker(mut self, marker: impl Into<String>) -> Self {
        self.skip_marker = marker.into();
        self
    }

    /// Makes map output independent of the map's iteration order.
    ///
    /// Useful for `HashMap` fields when output is compared or snapshotted.
    #[must_use]
    pub fn with_sorted_map_keys(mut self, sort: bool) -> Self {
        self.sort_map_keys = sort;
        self
    }
}

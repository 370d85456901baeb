//! Composite cache keys.
//!
//! Keys are opaque strings. Callers that address values by a sequence of
//! scalars (entity name, id, page number, flags) build one deterministic key
//! with [`create_key`], which joins the parts with a fixed separator. Prefix
//! operations on the store (`remove_by_prefix`, `invalidate_by_prefix`)
//! compose with this: `create_key` output namespaces naturally by its leading
//! parts.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Key;

/// Separator joining the parts of a composite key.
pub const KEY_SEPARATOR: &str = "::";

/// A single scalar part of a composite key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyPart {
    /// Arbitrary string segment.
    Str(String),
    /// Signed integer segment.
    Int(i64),
    /// Unsigned integer segment, for ids above `i64::MAX`.
    UInt(u64),
    /// Boolean segment, rendered as `true` / `false`.
    Bool(bool),
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Str(s) => f.write_str(s),
            KeyPart::Int(i) => write!(f, "{i}"),
            KeyPart::UInt(u) => write!(f, "{u}"),
            KeyPart::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        KeyPart::Str(value.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(value: String) -> Self {
        KeyPart::Str(value)
    }
}

impl From<i64> for KeyPart {
    fn from(value: i64) -> Self {
        KeyPart::Int(value)
    }
}

impl From<i32> for KeyPart {
    fn from(value: i32) -> Self {
        KeyPart::Int(value.into())
    }
}

impl From<u64> for KeyPart {
    fn from(value: u64) -> Self {
        KeyPart::UInt(value)
    }
}

impl From<u32> for KeyPart {
    fn from(value: u32) -> Self {
        KeyPart::UInt(value.into())
    }
}

impl From<bool> for KeyPart {
    fn from(value: bool) -> Self {
        KeyPart::Bool(value)
    }
}

/// Join an ordered sequence of scalar parts into one deterministic [`Key`].
///
/// Distinct sequences map to distinct keys as long as no string part contains
/// the separator itself; an empty trailing part still contributes a separator,
/// so `["foo"]` and `["foo", ""]` differ.
pub fn create_key<I, P>(parts: I) -> Key
where
    I: IntoIterator<Item = P>,
    P: Into<KeyPart>,
{
    let mut out = String::new();
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            out.push_str(KEY_SEPARATOR);
        }
        out.push_str(&part.into().to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_create_key_joins_parts_in_order() {
        let key = create_key([
            KeyPart::from("foo"),
            KeyPart::from("bar"),
            KeyPart::from(1i64),
            KeyPart::from(2i64),
        ]);
        assert_eq!(key, "foo::bar::1::2");
    }

    #[test]
    fn test_create_key_single_part() {
        assert_eq!(create_key(["foo"]), "foo");
    }

    #[test]
    fn test_create_key_empty_trailing_part_is_distinct() {
        assert_ne!(create_key(["foo"]), create_key(["foo", ""]));
        assert_eq!(create_key(["foo", ""]), "foo::");
    }

    #[test]
    fn test_create_key_scalar_parts() {
        let key = create_key([
            KeyPart::from("user"),
            KeyPart::from(42u64),
            KeyPart::from(true),
        ]);
        assert_eq!(key, "user::42::true");
    }

    #[test]
    fn test_create_key_empty_sequence() {
        let key: Key = create_key(std::iter::empty::<KeyPart>());
        assert_eq!(key, "");
    }

    proptest! {
        /// Separator-free part sequences of differing content or length
        /// never collide.
        #[test]
        fn prop_distinct_sequences_distinct_keys(
            a in proptest::collection::vec("[a-z0-9]{1,8}", 1..5),
            b in proptest::collection::vec("[a-z0-9]{1,8}", 1..5),
        ) {
            prop_assume!(a != b);
            let left = create_key(a.iter().map(|s| KeyPart::from(s.as_str())));
            let right = create_key(b.iter().map(|s| KeyPart::from(s.as_str())));
            prop_assert_ne!(left, right);
        }

        /// Key building is deterministic.
        #[test]
        fn prop_create_key_deterministic(
            parts in proptest::collection::vec("[a-z0-9]{0,8}", 0..6),
        ) {
            let first = create_key(parts.iter().map(|s| KeyPart::from(s.as_str())));
            let second = create_key(parts.iter().map(|s| KeyPart::from(s.as_str())));
            prop_assert_eq!(first, second);
        }
    }
}

//! Newtype IDs for type-safe record references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different collections.
//!
//! IDs are timestamp based (milliseconds since the Unix epoch), which keeps
//! them sortable by creation time. [`next_id`] resolves collisions against
//! the IDs already present in a collection.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>`, `Into<i64>`, `Display` and `FromStr` implementations
///
/// # Example
///
/// ```rust
/// # use homecare_core::define_id;
/// define_id!(RoomId);
/// define_id!(PhotoId);
///
/// let room = RoomId::new(1);
/// let photo = PhotoId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: RoomId = photo;
/// assert_eq!(room.as_i64(), photo.as_i64());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(TaskId);
define_id!(UserId);

/// Pick a timestamp-based ID that is unique within `existing`.
///
/// Returns `now_millis` unless it is already taken (or lower than an existing
/// ID, which happens when several records are created within the same
/// millisecond), in which case the next value above the current maximum is
/// used.
#[must_use]
pub fn next_id(now_millis: i64, existing: impl IntoIterator<Item = i64>) -> i64 {
    let max = existing.into_iter().max();
    match max {
        Some(max) if max >= now_millis => max + 1,
        _ => now_millis,
    }
}

//! Identifier newtypes for curriculum content.
//!
//! All identifiers are plain strings on the wire (serde-transparent) so that
//! snapshots written by the web frontend stay readable.

use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "typescript")]
use ts_rs::TS;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[cfg_attr(feature = "typescript", derive(TS))]
        #[cfg_attr(feature = "typescript", ts(export))]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create from anything string-like.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the underlying string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a course (e.g. `piano-fundamentals`).
    CourseId
);

string_id!(
    /// Identifier of a top-level curriculum section (e.g. `majorScales`).
    SectionId
);

string_id!(
    /// Identifier of a checkpoint inside a section (e.g. `keyboardIntro`).
    SubsectionId
);

string_id!(
    /// Name of an individually completable scale (e.g. `C Major`).
    ScaleName
);

string_id!(
    /// Name of an individually completable chord family (e.g. `Diminished`).
    FamilyName
);

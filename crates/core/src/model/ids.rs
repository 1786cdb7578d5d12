use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Declares a string-backed identifier newtype.
///
/// Catalog ids are authored as URL-safe slugs ("ai-fundamentals"), so the
/// wrappers stay transparent on the wire.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

string_id!(
    /// Unique identifier for a Course
    CourseId
);
string_id!(
    /// Unique identifier for a Module (globally unique across the catalog)
    ModuleId
);
string_id!(
    /// Unique identifier for a Lesson (globally unique across the catalog)
    LessonId
);
string_id!(
    /// Unique identifier for an Exercise embedded in a lesson
    ExerciseId
);
string_id!(
    /// Unique identifier for an Achievement definition
    AchievementId
);
string_id!(
    /// Unique identifier for a playground session
    SessionId
);

// ─── Tests ─────────────────────────────────────────────────────────────────────

//! Core identifier types for the `reschain` library.
//!
//! All types use smart constructors to ensure validity at construction time,
//! following the "parse, don't validate" principle.

use nutype::nutype;
use uuid::Uuid;

/// The name of one acquisition step, used in diagnostics and release traces.
///
/// `StepName` values are guaranteed to be non-empty and at most 255
/// characters. Once constructed, a `StepName` is always valid - no further
/// validation needed. Names are labels, not keys: a chain may legally hold
/// two resources acquired under the same name.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 255),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        AsRef,
        Deref,
        Display,
        Serialize,
        Deserialize
    )
)]
pub struct StepName(String);

impl StepName {
    /// Creates a `StepName` from a name known to be valid.
    ///
    /// Intended for literal names at chain assembly sites.
    ///
    /// # Panics
    /// Panics if the name is empty or longer than 255 characters, which is a
    /// programming error at the call site.
    pub fn of(name: &str) -> Self {
        Self::try_new(name).unwrap_or_else(|err| panic!("invalid step name {name:?}: {err}"))
    }
}

/// A globally unique identifier for one run of an acquisition chain, using
/// UUIDv7 format.
///
/// `ChainId` values are guaranteed to be UUIDv7, which provides:
/// - Time-based ordering capability
/// - Globally unique identification
/// - Correlation of log lines and leak-monitor entries with one run
#[nutype(
    validate(predicate = |id: &Uuid| id.get_version() == Some(uuid::Version::SortRand)),
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        AsRef,
        Deref,
        Display,
        Serialize,
        Deserialize
    )
)]
pub struct ChainId(Uuid);

impl ChainId {
    /// Creates a new `ChainId` with the current timestamp.
    ///
    /// This is a convenience method that generates a new `UUIDv7`.
    pub fn new() -> Self {
        // This will always succeed as Uuid::now_v7() always returns a valid v7 UUID
        Self::try_new(Uuid::now_v7()).expect("Uuid::now_v7() should always return a valid v7 UUID")
    }
}

impl Default for ChainId {
    fn default() -> Self {
        Self::new()
    }
}

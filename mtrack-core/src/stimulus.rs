use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use string_cache::DefaultAtom as Atom;

/// Interned stimulus identifier.
///
/// Every rendered frame logs the stimulus, so the identifier is an atom:
/// cloning it per frame is a refcount bump rather than a string copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StimulusId(Atom);

impl StimulusId {
    pub fn new(id: &str) -> Self {
        Self(Atom::from(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StimulusId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for StimulusId {
    fn from(id: String) -> Self {
        Self(Atom::from(id))
    }
}

impl fmt::Display for StimulusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StimulusId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StimulusId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(StimulusId::from)
    }
}

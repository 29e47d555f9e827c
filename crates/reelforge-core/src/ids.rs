//! Identifier types: movie ids, revision ids, and canonical input/artefact
//! ids.

use std::cmp::Ordering;
use std::fmt;

use crate::errors::{CoreError, CoreResult};

/// Opaque per-movie identifier; the root of a movie's directory under the
/// storage context's `basePath`.
pub type MovieId = String;

/// A revision label of the form `rev-NNNN`, compared numerically (so
/// `rev-10000` > `rev-9999` even though the zero-padded width differs).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RevisionId {
    raw: String,
    n: u64,
}

impl RevisionId {
    pub const PREFIX: &'static str = "rev-";
    pub const PAD_WIDTH: usize = 4;

    pub fn parse(s: &str) -> CoreResult<Self> {
        let suffix = s.strip_prefix(Self::PREFIX).ok_or_else(|| {
            CoreError::invalid_argument(format!("revision id missing 'rev-' prefix: {s}"))
        })?;
        let n: u64 = suffix.parse().map_err(|_| {
            CoreError::invalid_argument(format!("revision id is not numeric: {s}"))
        })?;
        Ok(Self {
            raw: s.to_string(),
            n,
        })
    }

    pub fn from_number(n: u64) -> Self {
        Self {
            raw: format!("{}{:0width$}", Self::PREFIX, n, width = Self::PAD_WIDTH),
            n,
        }
    }

    pub fn number(&self) -> u64 {
        self.n
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// `nextRevisionId(rev-NNNN) = rev-(NNNN+1)`.
    pub fn next(&self) -> Self {
        Self::from_number(self.n + 1)
    }

    /// `nextRevisionId(null) = rev-0001`.
    pub fn first() -> Self {
        Self::from_number(1)
    }

    /// Parse, falling back to `rev-0001` for absent or malformed input, per
    /// `nextRevisionId`'s contract for the "no prior revision" case.
    pub fn next_after(prev: Option<&str>) -> Self {
        match prev.map(Self::parse) {
            Some(Ok(rev)) => rev.next(),
            _ => Self::first(),
        }
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl PartialOrd for RevisionId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RevisionId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.n.cmp(&other.n)
    }
}

impl serde::Serialize for RevisionId {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.raw)
    }
}

impl<'de> serde::Deserialize<'de> for RevisionId {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        RevisionId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A canonical input or artefact identifier, e.g. `Input:InquiryPrompt`,
/// `Input:AudioProducer.AudioProducer.volume`, or
/// `Artifact:NarrationScript[segment=0&image=1]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanonicalId {
    Input(String),
    Artefact(String),
}

impl CanonicalId {
    pub fn parse(s: &str) -> CoreResult<Self> {
        if let Some(rest) = s.strip_prefix("Input:") {
            if rest.is_empty() {
                return Err(CoreError::invalid_argument("empty Input id"));
            }
            Ok(CanonicalId::Input(rest.to_string()))
        } else if let Some(rest) = s.strip_prefix("Artifact:") {
            if rest.is_empty() {
                return Err(CoreError::invalid_argument("empty Artifact id"));
            }
            Ok(CanonicalId::Artefact(rest.to_string()))
        } else {
            Err(CoreError::invalid_argument(format!(
                "id is not canonical (expected 'Input:' or 'Artifact:' prefix): {s}"
            )))
        }
    }

    pub fn is_input(s: &str) -> bool {
        s.starts_with("Input:")
    }

    pub fn is_artefact(s: &str) -> bool {
        s.starts_with("Artifact:")
    }

    pub fn as_string(&self) -> String {
        match self {
            CanonicalId::Input(rest) => format!("Input:{rest}"),
            CanonicalId::Artefact(rest) => format!("Artifact:{rest}"),
        }
    }
}

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

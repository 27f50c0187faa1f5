//! Error types for compound and formula registration.
//!
//! Every variant is local to one entry: a rejected registration leaves the
//! registry unchanged and the rest of the batch proceeds.

use std::fmt;

use thiserror::Error;

/// Which registry an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Compound,
    Formula,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntryKind::Compound => "compound",
            EntryKind::Formula => "formula",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The key is already taken; the first registration stays.
    #[error("{kind} '{key}' is already registered")]
    Duplicate { kind: EntryKind, key: String },

    #[error("{kind} '{key}' is not registered")]
    NotFound { kind: EntryKind, key: String },

    /// A formula names a compound key the compound registry does not hold.
    #[error("formula '{formula}' references unregistered compound '{compound}'")]
    UnresolvedReference { formula: String, compound: String },

    #[error("invalid {kind} '{key}': {reason}")]
    InvalidDefinition {
        kind: EntryKind,
        key: String,
        reason: String,
    },
}

impl Error {
    pub fn duplicate(kind: EntryKind, key: impl Into<String>) -> Self {
        Self::Duplicate {
            kind,
            key: key.into(),
        }
    }

    pub fn not_found(kind: EntryKind, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }

    pub fn unresolved(formula: impl Into<String>, compound: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            formula: formula.into(),
            compound: compound.into(),
        }
    }

    pub fn invalid(kind: EntryKind, key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            kind,
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// The key of the entry the error is about.
    pub fn key(&self) -> &str {
        match self {
            Self::Duplicate { key, .. }
            | Self::NotFound { key, .. }
            | Self::InvalidDefinition { key, .. } => key,
            Self::UnresolvedReference { formula, .. } => formula,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_reference_names_the_missing_compound() {
        let err = Error::unresolved("transmute", "Unobtainium");
        assert_eq!(
            err.to_string(),
            "formula 'transmute' references unregistered compound 'Unobtainium'"
        );
        assert_eq!(err.key(), "transmute");
    }

    #[test]
    fn duplicate_message_names_kind_and_key() {
        let err = Error::duplicate(EntryKind::Compound, "H2O");
        assert_eq!(err.to_string(), "compound 'H2O' is already registered");
    }
}

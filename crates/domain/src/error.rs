//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`PotHubError`]
//! at the port boundary. Callers only ever see the variants below; in
//! particular, "missing" and "not owned" are deliberately indistinguishable
//! ([`PotHubError::NotFound`] covers both).

use crate::id::PotId;

/// A single field-level validation failure.
///
/// Field names use the wire spelling (`potName`, `dimensions.width`, …)
/// so the HTTP layer can return them to form-style clients verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FieldIssue {
    /// A required field is absent (or blank, for text fields).
    #[error("{0} is required")]
    Missing(&'static str),

    /// A numeric field is present but not strictly positive.
    #[error("{0} must be positive")]
    NotPositive(&'static str),
}

impl FieldIssue {
    /// The wire name of the offending field.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing(field) | Self::NotPositive(field) => field,
        }
    }
}

/// Validation failure carrying **every** field issue found in one pass,
/// never just the first.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", join_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    /// Wrap a non-empty list of field issues.
    #[must_use]
    pub fn new(issues: Vec<FieldIssue>) -> Self {
        Self { issues }
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A record that does not exist — or is not owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Top-level error taxonomy for the pothub core.
#[derive(Debug, thiserror::Error)]
pub enum PotHubError {
    /// One or more field-level causes, returned together.
    #[error("validation failed")]
    Validation(#[from] ValidationError),

    /// Missing or not owned — the caller cannot tell which.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The pot exists but carries no soil-moisture readings.
    #[error("pot {pot} has no soil moisture readings")]
    NoData { pot: PotId },

    /// The publish could not be handed off to the transport.
    #[error("transport unavailable")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Unexpected persistence failure.
    #[error("storage failure")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl PotHubError {
    /// Shorthand for a pot-scoped [`NotFoundError`].
    #[must_use]
    pub fn pot_not_found(pot: PotId) -> Self {
        Self::NotFound(NotFoundError {
            entity: "Pot",
            id: pot.to_string(),
        })
    }

    /// Wrap an adapter error as a storage failure.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Box::new(err))
    }

    /// Wrap an adapter error as a transport failure.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Box::new(err))
    }
}

//! Scope addressing.

use crate::core::types::OrgId;
use crate::error::{Result, ScopeError};

/// One logical secret collection: `(org, project, environment)`.
///
/// The org is optional at construction so callers can build a scope before
/// an organization has been resolved; every remote operation checks it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope {
    pub org_id: Option<OrgId>,
    pub project: String,
    pub environment: String,
}

impl Scope {
    pub fn new(
        org_id: Option<impl Into<OrgId>>,
        project: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            org_id: org_id.map(Into::into),
            project: project.into(),
            environment: environment.into(),
        }
    }

    /// Resolved organization id.
    ///
    /// # Errors
    ///
    /// Returns `ScopeError::NoActiveOrg` when no org is set.
    pub fn org_id(&self) -> Result<&str> {
        match self.org_id.as_deref() {
            Some(org) if !org.is_empty() => Ok(org),
            _ => Err(ScopeError::NoActiveOrg.into()),
        }
    }

    /// Same project and environment under another org.
    pub fn with_org(&self, org_id: impl Into<OrgId>) -> Self {
        Self {
            org_id: Some(org_id.into()),
            ..self.clone()
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.org_id.as_deref().unwrap_or("?"),
            self.project,
            self.environment
        )
    }
}

//! Organization resolution.
//!
//! Decides which organization scope operations address, given the org
//! remembered in the identity and the caller's current memberships.
//!
//! ```text
//!   Unknown ──one membership──▶ Sole
//!      │
//!      ├──remembered and still a member──▶ Confirmed
//!      │
//!      └──several, prompt picks──▶ Chosen ──prompt says remember──▶ Confirmed
//! ```
//!
//! A remembered org the caller no longer belongs to is dropped and the
//! choice starts over.

use tracing::{debug, warn};

use crate::core::domain::OrgMembership;
use crate::core::types::OrgId;
use crate::error::{Result, ScopeError};

/// Where org resolution ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrgResolution {
    /// No org could be picked.
    Unknown,
    /// The caller belongs to exactly one org. Not remembered.
    Sole(OrgId),
    /// Picked for this invocation only.
    Chosen(OrgId),
    /// Remembered in the identity.
    Confirmed(OrgId),
}

impl OrgResolution {
    pub fn org_id(&self) -> Option<&str> {
        match self {
            Self::Unknown => None,
            Self::Sole(id) | Self::Chosen(id) | Self::Confirmed(id) => Some(id),
        }
    }

    /// The org id, or `ScopeError::NoActiveOrg`.
    pub fn require(&self) -> Result<&str> {
        self.org_id().ok_or_else(|| ScopeError::NoActiveOrg.into())
    }
}

/// A selection made by an [`OrgPrompt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgChoice {
    pub org_id: OrgId,
    /// Persist the choice as the active org.
    pub remember: bool,
}

/// Asks someone to pick among several memberships.
pub trait OrgPrompt {
    /// `None` when the user declines to choose.
    fn choose(&self, memberships: &[OrgMembership]) -> Result<Option<OrgChoice>>;
}

/// What the caller must write back to the identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persist {
    Keep,
    Save(OrgId),
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub state: OrgResolution,
    pub persist: Persist,
}

/// Run org resolution.
///
/// # Errors
///
/// Returns `ScopeError::NotFound` if the prompt picks an org outside
/// `memberships`, or whatever the prompt itself fails with.
pub fn resolve(
    active: Option<&str>,
    memberships: &[OrgMembership],
    prompt: &dyn OrgPrompt,
) -> Result<Resolved> {
    let active = active.filter(|id| !id.is_empty());

    if let Some(id) = active {
        if memberships.iter().any(|m| m.org_id == id) {
            debug!(org = id, "active org confirmed");
            return Ok(Resolved {
                state: OrgResolution::Confirmed(id.to_string()),
                persist: Persist::Keep,
            });
        }
        warn!(org = id, "active org is no longer in the membership list");
    }
    let fallback = if active.is_some() {
        Persist::Clear
    } else {
        Persist::Keep
    };

    match memberships {
        [] => Ok(Resolved {
            state: OrgResolution::Unknown,
            persist: fallback,
        }),
        [only] => {
            debug!(org = %only.org_id, "sole membership");
            Ok(Resolved {
                state: OrgResolution::Sole(only.org_id.clone()),
                persist: fallback,
            })
        }
        several => match prompt.choose(several)? {
            None => Ok(Resolved {
                state: OrgResolution::Unknown,
                persist: fallback,
            }),
            Some(choice) => {
                if !several.iter().any(|m| m.org_id == choice.org_id) {
                    return Err(ScopeError::NotFound(format!(
                        "organization {}",
                        choice.org_id
                    ))
                    .into());
                }
                if choice.remember {
                    Ok(Resolved {
                        persist: Persist::Save(choice.org_id.clone()),
                        state: OrgResolution::Confirmed(choice.org_id),
                    })
                } else {
                    Ok(Resolved {
                        state: OrgResolution::Chosen(choice.org_id),
                        persist: fallback,
                    })
                }
            }
        },
    }
}

//! Domain types.

pub mod identity;
mod machine;
mod report;
mod scope;
mod secret;

pub use identity::MachineIdentity;
pub use machine::{EnrolledMachine, OrgMembership, ProjectEnvironment};
pub use report::{ScopeReport, SyncAllReport, WrapFailure};
pub use scope::Scope;
pub use secret::{Secret, Secrets};

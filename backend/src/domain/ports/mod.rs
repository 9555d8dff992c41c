//! Domain ports for the hexagonal boundary.
//!
//! Every backend collaborator the session controller talks to is a trait
//! here. Outbound adapters (`outbound::memory`, `outbound::rest`) implement
//! them; unit tests substitute the generated mockall doubles.

mod macros;
pub(crate) use macros::define_port_error;

mod academic_directory;
mod identity_provider;
mod invite_code_repository;
mod message_sink;
mod profile_repository;
mod test_catalogue;

pub use academic_directory::{AcademicDirectory, AcademicDirectoryError};
#[cfg(test)]
pub use academic_directory::MockAcademicDirectory;
pub use identity_provider::{IdentityProvider, IdentityProviderError, SignUpOutcome};
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use invite_code_repository::{InviteCodeRepository, InviteCodeRepositoryError};
#[cfg(test)]
pub use invite_code_repository::MockInviteCodeRepository;
pub use message_sink::{MessageSink, MessageSinkError};
#[cfg(test)]
pub use message_sink::MockMessageSink;
pub use profile_repository::{ProfileRepository, ProfileRepositoryError};
#[cfg(test)]
pub use profile_repository::MockProfileRepository;
pub use test_catalogue::{TestCatalogue, TestCatalogueError};
#[cfg(test)]
pub use test_catalogue::MockTestCatalogue;

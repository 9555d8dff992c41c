//! Port for student profiles and teacher records.
//!
//! Students and teachers may live in separate tables; the port presents
//! them as one tagged [`Profile`].

use async_trait::async_trait;

use crate::domain::{Profile, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by profile storage.
    pub enum ProfileRepositoryError {
        /// The table store could not be reached.
        Connection { message: String } =>
            "profile store connection failed: {message}",
        /// A row for the identity already exists.
        Duplicate { message: String } =>
            "profile already exists: {message}",
        /// The query failed or returned rows that could not be decoded.
        Query { message: String } =>
            "profile query failed: {message}",
    }
}

/// Profile storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Profile owned by the identity, if present.
    async fn find_profile(&self, user_id: &UserId)
    -> Result<Option<Profile>, ProfileRepositoryError>;

    /// Insert a new profile; fails with `Duplicate` when one exists.
    async fn insert_profile(&self, profile: &Profile) -> Result<(), ProfileRepositoryError>;

    /// Whether a teacher record already uses the (lowercased) email.
    async fn teacher_email_exists(&self, email: &str) -> Result<bool, ProfileRepositoryError>;
}

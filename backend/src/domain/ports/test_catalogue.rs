//! Read-side port for tests shown on the dashboard.

use async_trait::async_trait;

use crate::domain::{TestScope, TestSummary};

use super::define_port_error;

define_port_error! {
    /// Errors raised when listing tests.
    pub enum TestCatalogueError {
        /// The table store could not be reached.
        Connection { message: String } =>
            "test catalogue connection failed: {message}",
        /// The query failed or returned rows that could not be decoded.
        Query { message: String } =>
            "test catalogue query failed: {message}",
    }
}

/// Port for listing tests by scope.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TestCatalogue: Send + Sync {
    /// Tests published for a group or building, ordered by title.
    async fn list_tests(&self, scope: TestScope) -> Result<Vec<TestSummary>, TestCatalogueError>;
}

//! Branch storage trait.

use async_trait::async_trait;

use crate::geo::Location;

use super::types::{Branch, BranchError, CreateBranchRequest, UpdateBranchRequest};

/// Store of branches with a proximity query.
#[async_trait]
pub trait BranchStore: Send + Sync {
    /// The branch nearest to `point` by great-circle distance.
    ///
    /// Fails with [`BranchError::NoBranches`] when the catalog is empty.
    /// Ties between equidistant branches resolve the same way on every call.
    async fn nearest(&self, point: Location) -> Result<Branch, BranchError>;

    async fn create(&self, request: CreateBranchRequest) -> Result<Branch, BranchError>;

    async fn get(&self, id: &str) -> Result<Branch, BranchError>;

    async fn list(&self) -> Vec<Branch>;

    async fn update(&self, id: &str, request: UpdateBranchRequest) -> Result<Branch, BranchError>;

    async fn delete(&self, id: &str) -> Result<(), BranchError>;
}

//! In-memory branch store backed by an R-tree.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use rstar::primitives::GeomWithData;
use rstar::RTree;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::geo::Location;

use super::store::BranchStore;
use super::types::{Branch, BranchError, CreateBranchRequest, UpdateBranchRequest};

const DEFAULT_OPERATING_HOURS: &str = "9:00 AM - 10:00 PM";

/// A branch position in the spatial index: unit-sphere cartesian coordinates
/// tagged with the branch id. Euclidean (chord) nearest-neighbour on the unit
/// sphere is great-circle nearest-neighbour.
type BranchPoint = GeomWithData<[f64; 3], String>;

struct Inner {
    branches: HashMap<String, Branch>,
    index: RTree<BranchPoint>,
}

impl Inner {
    /// Rebuild the index from scratch. Branch edits are rare and the catalog
    /// is small; proximity queries are the hot path.
    fn rebuild_index(&mut self) {
        let points: Vec<BranchPoint> = self
            .branches
            .values()
            .map(|b| BranchPoint::new(b.location.to_unit_sphere(), b.id.clone()))
            .collect();
        self.index = RTree::bulk_load(points);
    }
}

/// In-memory implementation of [`BranchStore`].
pub struct MemoryBranchStore {
    inner: RwLock<Inner>,
}

impl MemoryBranchStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                branches: HashMap::new(),
                index: RTree::new(),
            }),
        }
    }
}

impl Default for MemoryBranchStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BranchStore for MemoryBranchStore {
    async fn nearest(&self, point: Location) -> Result<Branch, BranchError> {
        let inner = self.inner.read().await;

        let hit = inner
            .index
            .nearest_neighbor(&point.to_unit_sphere())
            .ok_or(BranchError::NoBranches)?;

        inner
            .branches
            .get(&hit.data)
            .cloned()
            .ok_or(BranchError::NoBranches)
    }

    async fn create(&self, request: CreateBranchRequest) -> Result<Branch, BranchError> {
        let mut inner = self.inner.write().await;

        let now = Utc::now();
        let branch = Branch {
            id: Uuid::new_v4().to_string(),
            name: request.name,
            address: request.address,
            location: request.location,
            operating_hours: request
                .operating_hours
                .unwrap_or_else(|| DEFAULT_OPERATING_HOURS.to_string()),
            phone_number: request.phone_number,
            created_at: now,
            updated_at: now,
        };

        inner.branches.insert(branch.id.clone(), branch.clone());
        inner.rebuild_index();
        info!("Registered branch {} ({})", branch.name, branch.id);
        Ok(branch)
    }

    async fn get(&self, id: &str) -> Result<Branch, BranchError> {
        self.inner
            .read()
            .await
            .branches
            .get(id)
            .cloned()
            .ok_or_else(|| BranchError::NotFound(id.to_string()))
    }

    async fn list(&self) -> Vec<Branch> {
        let mut all: Vec<Branch> = self.inner.read().await.branches.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    async fn update(&self, id: &str, request: UpdateBranchRequest) -> Result<Branch, BranchError> {
        let mut inner = self.inner.write().await;

        let branch = inner
            .branches
            .get_mut(id)
            .ok_or_else(|| BranchError::NotFound(id.to_string()))?;

        if let Some(name) = request.name {
            branch.name = name;
        }
        if let Some(address) = request.address {
            branch.address = address;
        }
        if let Some(hours) = request.operating_hours {
            branch.operating_hours = hours;
        }
        if let Some(phone) = request.phone_number {
            branch.phone_number = Some(phone);
        }
        let moved = request.location.is_some();
        if let Some(location) = request.location {
            branch.location = location;
        }
        branch.updated_at = Utc::now();
        let updated = branch.clone();

        if moved {
            inner.rebuild_index();
        }
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), BranchError> {
        let mut inner = self.inner.write().await;

        if inner.branches.remove(id).is_none() {
            return Err(BranchError::NotFound(id.to_string()));
        }
        inner.rebuild_index();
        info!("Removed branch {}", id);
        Ok(())
    }
}

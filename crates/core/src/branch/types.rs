//! Types for branch operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::Location;

/// Errors that can occur during branch operations.
#[derive(Debug, Error)]
pub enum BranchError {
    #[error("Branch not found: {0}")]
    NotFound(String),

    #[error("No branches registered")]
    NoBranches,
}

/// A physical branch customers order from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: String,
    pub name: String,
    pub address: String,
    pub location: Location,
    pub operating_hours: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to register a new branch.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBranchRequest {
    pub name: String,
    pub address: String,
    pub location: Location,
    #[serde(default)]
    pub operating_hours: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Partial update applied by branch administration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBranchRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub operating_hours: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

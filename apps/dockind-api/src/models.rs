//! Wire types for the classification API

use chrono::{DateTime, Utc};
use dockind_core::Category;
use serde::{Deserialize, Serialize};

/// One completed classification, stored in insertion order and returned
/// to clients verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Filename supplied by the client
    pub filename: String,
    pub classification: Category,
    /// Completion time in UTC
    pub timestamp: DateTime<Utc>,
}

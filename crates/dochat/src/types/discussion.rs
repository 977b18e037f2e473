//! Discussion records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A discussion owning zero or more uploaded files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discussion {
    /// Row id
    pub id: i64,
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

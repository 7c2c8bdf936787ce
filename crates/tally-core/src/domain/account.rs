use serde::{Deserialize, Serialize};

/// The upstream account the relay posts as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub id: String,
    pub username: String,
    pub name: String,
}

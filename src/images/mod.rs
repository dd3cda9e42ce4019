pub mod services;

use serde::{Deserialize, Serialize};

/// What clients get to see of a stored asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub secure_url: String,
    pub original_filename: String,
}

impl ImageRef {
    /// Rebuilds a reference from the two nullable columns it is stored in.
    pub fn from_columns(url: Option<String>, filename: Option<String>) -> Option<Self> {
        url.map(|secure_url| ImageRef {
            secure_url,
            original_filename: filename.unwrap_or_default(),
        })
    }
}

/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Response envelope shared by every REST endpoint
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};

fn default_success() -> bool {
    true
}

/// `{success, msg, data}` envelope; `data` is endpoint specific
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub msg: String,
    pub data: T,
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SetMaxConcurrentRequest {
    pub max_concurrent: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MaxConcurrentResponse {
    pub max_concurrent: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearResponse {
    pub cleared: usize,
}

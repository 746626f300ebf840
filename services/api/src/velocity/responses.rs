use serde::{Deserialize, Serialize};

use crate::jira::models::Sprint;
use crate::velocity::compute::VelocityPoint;

#[derive(Debug, Serialize, Deserialize)]
pub struct VelocityResponse {
    pub board: u64,
    pub data: Vec<VelocityPoint>,
    pub average_velocity: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SprintListResponse {
    pub board: u64,
    pub data: Vec<Sprint>,
    pub count: usize,
}

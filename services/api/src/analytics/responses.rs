use serde::{Deserialize, Serialize};
use sprintdeck_cache::CacheStats;

use crate::analytics::compute::{MemberStats, TrendPoint};

#[derive(Debug, Serialize, Deserialize)]
pub struct CommitTrendsResponse {
    pub owner: String,
    pub repo: String,
    pub period: String,
    pub data: Vec<TrendPoint>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TeamPerformanceResponse {
    pub board: u64,
    pub sprint_id: i64,
    pub sprint_name: String,
    pub data: Vec<MemberStats>,
}

/// Outcome of one upstream reachability probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    pub status: String,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpstreamProbes {
    pub jira: ProbeResult,
    pub github: ProbeResult,
}

#[derive(Debug, Serialize)]
pub struct ToolHealthResponse {
    pub jira: ProbeResult,
    pub github: ProbeResult,
    pub cache: CacheStats,
}

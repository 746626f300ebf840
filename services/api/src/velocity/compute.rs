use serde::{Deserialize, Serialize};

use crate::jira::models::{Issue, Sprint};

/// One sprint's commitment vs. completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VelocityPoint {
    pub sprint_id: i64,
    pub sprint_name: String,
    pub commitment: f64,
    pub completed: f64,
    pub velocity: f64,
}

/// Sum committed and completed story points for a sprint.
///
/// Commitment counts every estimated issue in the sprint; completed counts
/// only done issues. Unestimated issues contribute nothing to either sum.
pub fn build_velocity_point(sprint: &Sprint, issues: &[Issue]) -> VelocityPoint {
    let commitment: f64 = issues.iter().filter_map(|i| i.story_points).sum();
    let completed: f64 = issues
        .iter()
        .filter(|i| i.is_done())
        .filter_map(|i| i.story_points)
        .sum();

    VelocityPoint {
        sprint_id: sprint.id,
        sprint_name: sprint.name.clone(),
        commitment,
        completed,
        velocity: completed,
    }
}

pub fn average_velocity(points: &[VelocityPoint]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    points.iter().map(|p| p.velocity).sum::<f64>() / points.len() as f64
}

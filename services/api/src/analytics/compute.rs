use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sprintdeck_common::error::{SprintdeckError, SprintdeckResult};

use crate::github::models::{Commit, PullRequest};
use crate::jira::models::Issue;

/// One month's bucket of repo activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    /// "YYYY-MM"
    pub month: String,
    pub commit_count: u64,
    pub prs_opened: u64,
    pub prs_merged: u64,
}

/// Per-member join of sprint issues and commit authorship.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberStats {
    pub name: String,
    pub issues_assigned: u64,
    pub issues_completed: u64,
    pub story_points_completed: f64,
    pub commit_count: u64,
}

/// Parse a trend period ("3m", "6m", "12m") into a month count.
pub fn parse_period(period: &str) -> SprintdeckResult<u32> {
    match period {
        "3m" => Ok(3),
        "6m" => Ok(6),
        "12m" => Ok(12),
        other => Err(SprintdeckError::Validation(format!(
            "invalid period '{other}', expected 3m, 6m or 12m"
        ))),
    }
}

/// Start of the oldest month covered by an n-month window ending now.
pub fn period_cutoff(now: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    let (mut year, mut month) = (now.year(), now.month());
    for _ in 1..months {
        if month == 1 {
            month = 12;
            year -= 1;
        } else {
            month -= 1;
        }
    }
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
        .unwrap_or(now)
}

/// Bucket commits and pull requests into the last `months` calendar months.
///
/// Every month in the window appears in the output, quiet months as zeros,
/// so charts get a continuous axis. Activity outside the window is dropped.
pub fn bucket_by_month(
    commits: &[Commit],
    pulls: &[PullRequest],
    months: u32,
    now: DateTime<Utc>,
) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<String, TrendPoint> = BTreeMap::new();

    let (mut year, mut month) = (now.year(), now.month());
    for _ in 0..months {
        let label = format!("{year:04}-{month:02}");
        buckets.insert(
            label.clone(),
            TrendPoint {
                month: label,
                commit_count: 0,
                prs_opened: 0,
                prs_merged: 0,
            },
        );
        if month == 1 {
            month = 12;
            year -= 1;
        } else {
            month -= 1;
        }
    }

    for commit in commits {
        let label = commit.date.format("%Y-%m").to_string();
        if let Some(bucket) = buckets.get_mut(&label) {
            bucket.commit_count += 1;
        }
    }

    for pr in pulls {
        let opened = pr.created_at.format("%Y-%m").to_string();
        if let Some(bucket) = buckets.get_mut(&opened) {
            bucket.prs_opened += 1;
        }
        if let Some(merged_at) = pr.merged_at {
            let merged = merged_at.format("%Y-%m").to_string();
            if let Some(bucket) = buckets.get_mut(&merged) {
                bucket.prs_merged += 1;
            }
        }
    }

    // "YYYY-MM" sorts chronologically
    buckets.into_values().collect()
}

/// Join sprint issues with commit authorship, keyed by member name
/// (case-insensitive). Members appear if they have either issues or commits.
pub fn member_stats(issues: &[Issue], commits: &[Commit]) -> Vec<MemberStats> {
    fn entry<'a>(
        map: &'a mut BTreeMap<String, MemberStats>,
        name: &str,
    ) -> &'a mut MemberStats {
        map.entry(name.to_lowercase()).or_insert_with(|| MemberStats {
            name: name.to_string(),
            issues_assigned: 0,
            issues_completed: 0,
            story_points_completed: 0.0,
            commit_count: 0,
        })
    }

    let mut by_member: BTreeMap<String, MemberStats> = BTreeMap::new();

    for issue in issues {
        let Some(assignee) = issue.assignee.as_deref() else {
            continue;
        };
        let stats = entry(&mut by_member, assignee);
        stats.issues_assigned += 1;
        if issue.is_done() {
            stats.issues_completed += 1;
            stats.story_points_completed += issue.story_points.unwrap_or(0.0);
        }
    }

    for commit in commits {
        let Some(author) = commit.author.as_deref() else {
            continue;
        };
        entry(&mut by_member, author).commit_count += 1;
    }

    let mut members: Vec<MemberStats> = by_member.into_values().collect();
    members.sort_by(|a, b| {
        b.story_points_completed
            .partial_cmp(&a.story_points_completed)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.commit_count.cmp(&a.commit_count))
            .then_with(|| a.name.cmp(&b.name))
    });
    members
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().expect("valid timestamp")
    }

    fn commit(author: Option<&str>, date: &str) -> Commit {
        Commit {
            sha: "abc".to_string(),
            author: author.map(str::to_string),
            message: "m".to_string(),
            date: ts(date),
            url: String::new(),
        }
    }

    fn pr(created: &str, merged: Option<&str>) -> PullRequest {
        PullRequest {
            number: 1,
            state: "closed".to_string(),
            author: None,
            created_at: ts(created),
            merged_at: merged.map(ts),
        }
    }

    fn issue(assignee: Option<&str>, status: &str, points: Option<f64>) -> Issue {
        Issue {
            key: "PLAT-1".to_string(),
            status: status.to_string(),
            story_points: points,
            assignee: assignee.map(str::to_string),
            issue_type: "Story".to_string(),
        }
    }

    // ── parse_period / period_cutoff ───────────────────────────────

    #[test]
    fn known_periods_parse() {
        assert_eq!(parse_period("3m").unwrap(), 3);
        assert_eq!(parse_period("6m").unwrap(), 6);
        assert_eq!(parse_period("12m").unwrap(), 12);
    }

    #[test]
    fn unknown_period_rejected() {
        let err = parse_period("1y").unwrap_err();
        assert!(err.to_string().contains("period"));
    }

    #[test]
    fn cutoff_is_first_of_oldest_month() {
        let now = ts("2026-08-29T12:00:00Z");
        assert_eq!(period_cutoff(now, 3), ts("2026-06-01T00:00:00Z"));
    }

    #[test]
    fn cutoff_crosses_year_boundary() {
        let now = ts("2026-02-15T12:00:00Z");
        assert_eq!(period_cutoff(now, 6), ts("2025-09-01T00:00:00Z"));
    }

    // ── bucket_by_month ────────────────────────────────────────────

    #[test]
    fn buckets_cover_whole_window() {
        let now = ts("2026-08-29T12:00:00Z");
        let points = bucket_by_month(&[], &[], 3, now);
        let labels: Vec<&str> = points.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(labels, vec!["2026-06", "2026-07", "2026-08"]);
        assert!(points.iter().all(|p| p.commit_count == 0));
    }

    #[test]
    fn commits_and_prs_land_in_their_months() {
        let now = ts("2026-08-29T12:00:00Z");
        let commits = vec![
            commit(Some("alice"), "2026-07-05T10:00:00Z"),
            commit(Some("bob"), "2026-07-20T10:00:00Z"),
            commit(Some("alice"), "2026-08-01T10:00:00Z"),
        ];
        let pulls = vec![
            pr("2026-07-06T10:00:00Z", Some("2026-08-02T10:00:00Z")),
            pr("2026-08-10T10:00:00Z", None),
        ];

        let points = bucket_by_month(&commits, &pulls, 3, now);
        let july = points.iter().find(|p| p.month == "2026-07").unwrap();
        assert_eq!(july.commit_count, 2);
        assert_eq!(july.prs_opened, 1);
        assert_eq!(july.prs_merged, 0);

        let august = points.iter().find(|p| p.month == "2026-08").unwrap();
        assert_eq!(august.commit_count, 1);
        assert_eq!(august.prs_opened, 1);
        assert_eq!(august.prs_merged, 1);
    }

    #[test]
    fn activity_outside_window_is_dropped() {
        let now = ts("2026-08-29T12:00:00Z");
        let commits = vec![commit(Some("alice"), "2025-01-01T10:00:00Z")];
        let points = bucket_by_month(&commits, &[], 3, now);
        assert!(points.iter().all(|p| p.commit_count == 0));
    }

    #[test]
    fn window_crosses_year_in_order() {
        let now = ts("2026-02-15T12:00:00Z");
        let points = bucket_by_month(&[], &[], 6, now);
        let labels: Vec<&str> = points.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(
            labels,
            vec!["2025-09", "2025-10", "2025-11", "2025-12", "2026-01", "2026-02"]
        );
    }

    // ── member_stats ───────────────────────────────────────────────

    #[test]
    fn joins_issues_and_commits_by_name() {
        let issues = vec![
            issue(Some("Alice"), "Done", Some(5.0)),
            issue(Some("Alice"), "In Progress", Some(3.0)),
            issue(Some("Bob"), "Done", Some(2.0)),
        ];
        let commits = vec![
            commit(Some("alice"), "2026-08-01T10:00:00Z"),
            commit(Some("alice"), "2026-08-02T10:00:00Z"),
            commit(Some("carol"), "2026-08-03T10:00:00Z"),
        ];

        let stats = member_stats(&issues, &commits);
        assert_eq!(stats.len(), 3);

        // Alice leads on story points
        assert_eq!(stats[0].name, "Alice");
        assert_eq!(stats[0].issues_assigned, 2);
        assert_eq!(stats[0].issues_completed, 1);
        assert_eq!(stats[0].story_points_completed, 5.0);
        assert_eq!(stats[0].commit_count, 2);

        assert_eq!(stats[1].name, "Bob");
        assert_eq!(stats[1].story_points_completed, 2.0);

        // Commit-only contributors still appear
        let carol = stats.iter().find(|m| m.name == "carol").unwrap();
        assert_eq!(carol.commit_count, 1);
        assert_eq!(carol.issues_assigned, 0);
    }

    #[test]
    fn unassigned_issues_and_anonymous_commits_ignored() {
        let issues = vec![issue(None, "Done", Some(5.0))];
        let commits = vec![commit(None, "2026-08-01T10:00:00Z")];
        assert!(member_stats(&issues, &commits).is_empty());
    }

    #[test]
    fn done_without_estimate_counts_as_zero_points() {
        let issues = vec![issue(Some("Dana"), "Done", None)];
        let stats = member_stats(&issues, &[]);
        assert_eq!(stats[0].issues_completed, 1);
        assert_eq!(stats[0].story_points_completed, 0.0);
    }
}

// ABOUTME: Aggregate data summary — user and project totals with categorical breakdowns.
// ABOUTME: Both collections are fetched concurrently and must succeed together.

use chrono::{DateTime, Local};

use crate::api::{ApiError, Backend, ProjectRecord, UserRecord};

/// Occurrence counts per category, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Breakdown {
    entries: Vec<(String, usize)>,
}

impl Breakdown {
    /// Count how often each key occurs.
    pub fn count<'a, I>(keys: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut entries: Vec<(String, usize)> = Vec::new();
        for key in keys {
            match entries.iter_mut().find(|(k, _)| k == key) {
                Some((_, n)) => *n += 1,
                None => entries.push((key.to_string(), 1)),
            }
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[(String, usize)] {
        &self.entries
    }

    /// Count for a single category, zero when absent.
    pub fn get(&self, key: &str) -> usize {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map_or(0, |(_, n)| *n)
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, n)| n).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Totals and breakdowns shown in the summary panel.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSummary {
    pub users_total: usize,
    pub departments: Breakdown,
    pub projects_total: usize,
    pub statuses: Breakdown,
    pub fetched_at: DateTime<Local>,
}

impl DataSummary {
    pub fn from_records(users: &[UserRecord], projects: &[ProjectRecord]) -> Self {
        Self {
            users_total: users.len(),
            departments: Breakdown::count(users.iter().map(|u| u.department.as_str())),
            projects_total: projects.len(),
            statuses: Breakdown::count(projects.iter().map(|p| p.status.as_str())),
            fetched_at: Local::now(),
        }
    }
}

/// Fetch users and projects concurrently and build the summary.
///
/// Fails if either request fails; no partial summary is produced.
pub async fn fetch_summary(backend: &dyn Backend) -> Result<DataSummary, ApiError> {
    let (users, projects) = tokio::try_join!(backend.users(), backend.projects())?;
    Ok(DataSummary::from_records(&users, &projects))
}

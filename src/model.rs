//! Input data for a project analytics report.
//!
//! The types mirror the payload served by the analytics API: camelCase field
//! names, optional priority breakdown and an ordered category list.  They carry
//! no rendering concerns so they can be deserialized straight from JSON and
//! handed to [`crate::report::ReportGenerator`].

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Insertion-ordered label/count pairs.
///
/// JSON objects keep their key order when deserialized into a `Tally`, so the
/// order in which the API lists statuses is the order in which they render.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    entries: Vec<(String, u64)>,
}

impl Tally {
    /// Creates an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry and returns the updated tally.
    pub fn with(mut self, label: impl Into<String>, count: u64) -> Self {
        self.push(label, count);
        self
    }

    /// Appends an entry.  Duplicate labels are kept as separate rows.
    pub fn push(&mut self, label: impl Into<String>, count: u64) {
        self.entries.push((label.into(), count));
    }

    /// Returns the entries in insertion order.
    pub fn entries(&self) -> &[(String, u64)] {
        &self.entries
    }

    /// Sum of every count in the tally, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |total, (_, count)| total.saturating_add(*count))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<L: Into<String>> FromIterator<(L, u64)> for Tally {
    fn from_iter<I: IntoIterator<Item = (L, u64)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(label, count)| (label.into(), count))
                .collect(),
        }
    }
}

impl Serialize for Tally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, count) in &self.entries {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

struct TallyVisitor;

impl<'de> Visitor<'de> for TallyVisitor {
    type Value = Tally;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of labels to non-negative counts")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Tally, A::Error> {
        let mut tally = Tally {
            entries: Vec::with_capacity(access.size_hint().unwrap_or(0)),
        };
        while let Some((label, count)) = access.next_entry::<String, u64>()? {
            tally.entries.push((label, count));
        }
        Ok(tally)
    }
}

impl<'de> Deserialize<'de> for Tally {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TallyVisitor)
    }
}

/// Task total for a single category.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub category_name: String,
    pub total_tasks: u64,
}

impl CategoryCount {
    pub fn new(category_name: impl Into<String>, total_tasks: u64) -> Self {
        Self {
            category_name: category_name.into(),
            total_tasks,
        }
    }
}

/// Statistics snapshot for one project.
///
/// Values are trusted as delivered: `completion_rate` is not reconciled with
/// the sub-task counts and `overdue_sub_tasks` is independent of the status
/// breakdown.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectStatistics {
    pub project_name: String,
    pub member_count: u64,
    pub main_task_count: u64,
    pub sub_task_count: u64,
    pub completed_sub_tasks: u64,
    pub overdue_sub_tasks: u64,
    /// Fraction in `[0, 1]`.
    pub completion_rate: f64,
    pub tasks_by_status: Tally,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks_by_priority: Option<Tally>,
    pub tasks_by_category: Vec<CategoryCount>,
}

impl ProjectStatistics {
    /// Creates an all-zero snapshot for the named project.
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            ..Self::default()
        }
    }

    /// Sub-tasks not yet completed.  Saturates at zero for inconsistent input.
    pub fn remaining_sub_tasks(&self) -> u64 {
        self.sub_task_count.saturating_sub(self.completed_sub_tasks)
    }
}

/// A member of the project roster.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMember {
    pub id: String,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl ProjectMember {
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            middle_name: None,
            last_name: last_name.into(),
            role: None,
        }
    }

    /// Sets the middle name and returns the updated member.
    pub fn with_middle_name(mut self, middle_name: impl Into<Option<String>>) -> Self {
        self.middle_name = middle_name.into();
        self
    }

    /// Sets the role and returns the updated member.
    pub fn with_role(mut self, role: impl Into<Option<String>>) -> Self {
        self.role = role.into();
        self
    }

    /// Non-empty name parts joined by single spaces.
    pub fn display_name(&self) -> String {
        [
            Some(self.first_name.as_str()),
            self.middle_name.as_deref(),
            Some(self.last_name.as_str()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_keeps_json_key_order() {
        let tally: Tally =
            serde_json::from_str(r#"{"Todo": 4, "Done": 7, "Doing": 3}"#).expect("valid tally");
        let labels: Vec<_> = tally.entries().iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, ["Todo", "Done", "Doing"]);
        assert_eq!(tally.total(), 14);
    }

    #[test]
    fn tally_total_saturates() {
        let tally = Tally::new().with("A", u64::MAX).with("B", 2);
        assert_eq!(tally.total(), u64::MAX);
    }

    #[test]
    fn statistics_deserialize_from_camel_case() {
        let stats: ProjectStatistics = serde_json::from_str(
            r#"{
                "projectName": "Q3 Launch",
                "memberCount": 5,
                "subTaskCount": 10,
                "completedSubTasks": 4,
                "completionRate": 0.4,
                "tasksByStatus": {"Done": 4},
                "tasksByCategory": [{"categoryName": "Design", "totalTasks": 2}]
            }"#,
        )
        .expect("valid statistics");

        assert_eq!(stats.project_name, "Q3 Launch");
        assert_eq!(stats.main_task_count, 0);
        assert!(stats.tasks_by_priority.is_none());
        assert_eq!(stats.tasks_by_category[0], CategoryCount::new("Design", 2));
        assert_eq!(stats.remaining_sub_tasks(), 6);
    }

    #[test]
    fn remaining_never_underflows() {
        let mut stats = ProjectStatistics::new("Broken");
        stats.sub_task_count = 2;
        stats.completed_sub_tasks = 5;
        assert_eq!(stats.remaining_sub_tasks(), 0);
    }

    #[test]
    fn display_name_skips_empty_parts() {
        let member = ProjectMember::new("1", "Ada", "Lovelace")
            .with_middle_name(Some("  ".to_string()));
        assert_eq!(member.display_name(), "Ada Lovelace");

        let member = ProjectMember::new("2", "", "Hopper").with_middle_name(Some("M".to_string()));
        assert_eq!(member.display_name(), "M Hopper");
    }
}

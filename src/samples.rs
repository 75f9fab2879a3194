//! Sample project data used by the CLI `sample` command and the demo.

use crate::model::{CategoryCount, ProjectMember, ProjectStatistics, Tally};

/// Owner id matching one of [`sample_members`].
pub const SAMPLE_OWNER_ID: &str = "u-100";

pub fn sample_statistics() -> ProjectStatistics {
    ProjectStatistics {
        project_name: "Q3 Launch".to_string(),
        member_count: 5,
        main_task_count: 12,
        sub_task_count: 48,
        completed_sub_tasks: 30,
        overdue_sub_tasks: 4,
        completion_rate: 0.625,
        tasks_by_status: Tally::new()
            .with("To Do", 8)
            .with("In Progress", 10)
            .with("In Review", 4)
            .with("Done", 26),
        tasks_by_priority: Some(
            Tally::new()
                .with("high", 9)
                .with("medium", 21)
                .with("low", 18),
        ),
        tasks_by_category: vec![
            CategoryCount::new("Frontend", 14),
            CategoryCount::new("Backend", 12),
            CategoryCount::new("Infrastructure and Deployment", 7),
            CategoryCount::new("Design", 6),
            CategoryCount::new("QA", 9),
        ],
    }
}

pub fn sample_members() -> Vec<ProjectMember> {
    vec![
        ProjectMember::new("u-100", "Ada", "Lovelace").with_role("Developer".to_string()),
        ProjectMember::new("u-101", "Grace", "Hopper")
            .with_middle_name("Brewster".to_string())
            .with_role("Project Manager".to_string()),
        ProjectMember::new("u-102", "Alan", "Turing").with_role("Developer".to_string()),
        ProjectMember::new("u-103", "Edsger", "Dijkstra"),
        ProjectMember::new("u-104", "Barbara", "Liskov").with_role("QA".to_string()),
    ]
}

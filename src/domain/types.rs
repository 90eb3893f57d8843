//! Shared domain enumerations aligned with the persisted job queue.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Scheduled,
    Running,
    Done,
    Failed,
    Killed,
}

impl JobState {
    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Pending => "Pending",
            JobState::Scheduled => "Scheduled",
            JobState::Running => "Running",
            JobState::Done => "Done",
            JobState::Failed => "Failed",
            JobState::Killed => "Killed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Done | JobState::Failed | JobState::Killed)
    }
}

impl TryFrom<&str> for JobState {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Pending" | "Latest" => Ok(JobState::Pending),
            "Scheduled" => Ok(JobState::Scheduled),
            "Running" => Ok(JobState::Running),
            "Done" => Ok(JobState::Done),
            "Failed" => Ok(JobState::Failed),
            "Killed" => Ok(JobState::Killed),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    ExportHierarchy,
}

impl JobType {
    pub fn as_str(self) -> &'static str {
        match self {
            JobType::ExportHierarchy => "export_hierarchy",
        }
    }
}

impl TryFrom<&str> for JobType {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "export_hierarchy" => Ok(JobType::ExportHierarchy),
            _ => Err(()),
        }
    }
}

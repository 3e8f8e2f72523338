//! Viewer roles and task visibility scopes.
//!
//! Role-based visibility is passed explicitly to the task store instead of
//! being read from ambient session state.

use crate::model::task::{Task, UserId};
use serde::{Deserialize, Serialize};

/// Board role of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Role {
    /// Creates, edits and deletes tasks; sees every task they own.
    Employer,
    /// Executes tasks assigned to them by `employer_id`.
    Helper { employer_id: UserId },
}

/// Caller identity for board use-cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    pub user_id: UserId,
    pub role: Role,
}

impl Viewer {
    pub fn employer(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Employer,
        }
    }

    pub fn helper(user_id: UserId, employer_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Helper { employer_id },
        }
    }

    pub fn is_employer(&self) -> bool {
        matches!(self.role, Role::Employer)
    }

    /// Employer whose board this viewer works on.
    pub fn board_owner(&self) -> &UserId {
        match &self.role {
            Role::Employer => &self.user_id,
            Role::Helper { employer_id } => employer_id,
        }
    }

    /// Listing filter for this viewer.
    pub fn scope(&self) -> ViewerScope {
        match &self.role {
            Role::Employer => ViewerScope::OwnedBy(self.user_id.clone()),
            Role::Helper { employer_id } => ViewerScope::AssignedTo {
                helper_id: self.user_id.clone(),
                employer_id: employer_id.clone(),
            },
        }
    }

    /// True when this viewer may edit or delete `task`.
    pub fn can_manage(&self, task: &Task) -> bool {
        self.is_employer() && task.employer_id == self.user_id
    }
}

/// Mutually exclusive task listing filters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewerScope {
    /// All tasks created by this employer.
    OwnedBy(UserId),
    /// Tasks of `employer_id` assigned to this helper. Assignments left over
    /// from another employer stay hidden.
    AssignedTo {
        helper_id: UserId,
        employer_id: UserId,
    },
}

impl ViewerScope {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::OwnedBy(employer_id) => &task.employer_id == employer_id,
            Self::AssignedTo {
                helper_id,
                employer_id,
            } => {
                &task.employer_id == employer_id && task.assigned_to.as_ref() == Some(helper_id)
            }
        }
    }
}

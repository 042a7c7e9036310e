use chrono::{DateTime, Utc};
use mongodb::bson;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub leader_uid: String,
    pub leader_name: String,
    pub member_uids: Vec<String>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub last_activity_at: DateTime<Utc>,
}

/// What a member removal has to do to the two documents involved. Planned
/// up front so the transaction body stays a straight-line sequence of
/// writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalPlan {
    /// Pull the uid from `member_uids` and clear the user's `team_id`.
    DetachMember,
    /// The uid is the last member left; delete the team document and clear
    /// the user's `team_id` in the same transaction.
    DeleteTeam,
}

impl Team {
    /// A user may lead at most one team; `existing_led_team` is whatever the
    /// store found for the caller's `leader_uid`.
    pub fn check_create(existing_led_team: Option<&Team>) -> Result<(), AppError> {
        if existing_led_team.is_some() {
            return Err(AppError::DuplicateKey(
                "You already lead a team".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_member(&self, uid: &str) -> bool {
        self.member_uids.iter().any(|m| m == uid)
    }

    /// Decide what removing `uid` does. `None` when the uid is not on the
    /// team at all.
    pub fn plan_removal(&self, uid: &str) -> Option<RemovalPlan> {
        if !self.is_member(uid) {
            return None;
        }
        if self.member_uids.len() == 1 {
            Some(RemovalPlan::DeleteTeam)
        } else {
            Some(RemovalPlan::DetachMember)
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTeam {
    #[validate(length(min = 2, max = 60))]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddMember {
    pub uid: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(members: &[&str]) -> Team {
        Team {
            id: Some(ObjectId::new()),
            name: "Night Owls".to_string(),
            leader_uid: members.first().unwrap_or(&"leader").to_string(),
            leader_name: "Leader".to_string(),
            member_uids: members.iter().map(|m| m.to_string()).collect(),
            created_at: Utc::now(),
            last_activity_at: Utc::now(),
        }
    }

    #[test]
    fn removing_a_regular_member_detaches() {
        let t = team(&["leader", "m2", "m3"]);
        assert_eq!(t.plan_removal("m2"), Some(RemovalPlan::DetachMember));
    }

    #[test]
    fn removing_the_last_member_deletes_the_team() {
        let t = team(&["leader"]);
        assert_eq!(t.plan_removal("leader"), Some(RemovalPlan::DeleteTeam));
    }

    #[test]
    fn removing_a_non_member_is_a_no_op() {
        let t = team(&["leader", "m2"]);
        assert_eq!(t.plan_removal("stranger"), None);
    }

    #[test]
    fn creating_a_team_while_already_leading_one_is_rejected() {
        let led = team(&["leader", "m2"]);
        assert!(matches!(
            Team::check_create(Some(&led)),
            Err(AppError::DuplicateKey(_))
        ));
    }

    #[test]
    fn creating_a_first_team_is_allowed() {
        assert!(Team::check_create(None).is_ok());
    }
}

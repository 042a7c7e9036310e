use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Manually advanced by an admin working the inbox.
pub const SPONSORSHIP_STATUSES: [&str; 4] = ["New", "Contacted", "In Progress", "Closed"];

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SponsorshipRequest {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub brand_name: String,
    pub contact_name: String,
    pub email: String,
    pub sponsorship_type: String,
    pub message: String,
    pub status: String,
    pub created_at: BsonDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSponsorshipRequest {
    #[validate(length(min = 1, max = 120))]
    pub brand_name: String,
    #[validate(length(min = 1, max = 120))]
    pub contact_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 60))]
    pub sponsorship_type: String,
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSponsorshipStatus {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_list_covers_the_inbox_workflow() {
        assert!(SPONSORSHIP_STATUSES.contains(&"New"));
        assert!(SPONSORSHIP_STATUSES.contains(&"Closed"));
        assert!(!SPONSORSHIP_STATUSES.contains(&"Archived"));
    }
}

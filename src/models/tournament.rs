use chrono::{DateTime, Duration, Utc};
use mongodb::bson;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::RegistrationError;
use crate::models::bracket::Match;

/// How long before `start_date` the organizer may fill in room details.
pub const ROOM_DETAILS_WINDOW_MINUTES: i64 = 15;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TournamentStatus {
    Upcoming,
    Live,
    Ongoing,
    Completed,
    Cancelled,
}

impl TournamentStatus {
    /// Players may still register while the tournament is in one of these.
    pub fn registration_open(&self) -> bool {
        matches!(self, TournamentStatus::Upcoming | TournamentStatus::Live)
    }

    /// "Active" for dashboard purposes: anything not finished or cancelled.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            TournamentStatus::Upcoming | TournamentStatus::Live | TournamentStatus::Ongoing
        )
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Upcoming" => Some(TournamentStatus::Upcoming),
            "Live" => Some(TournamentStatus::Live),
            "Ongoing" => Some(TournamentStatus::Ongoing),
            "Completed" => Some(TournamentStatus::Completed),
            "Cancelled" => Some(TournamentStatus::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentStatus::Upcoming => "Upcoming",
            TournamentStatus::Live => "Live",
            TournamentStatus::Ongoing => "Ongoing",
            TournamentStatus::Completed => "Completed",
            TournamentStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered player, embedded in the tournament document. Mutating the
/// roster rewrites (part of) the parent tournament, not a child collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Participant {
    /// The registering user's id (hex).
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_game_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub game_id: String,
    // Denormalized from the game at creation time, never re-synced.
    pub game_name: String,
    pub game_icon_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_image_url: Option<String>,
    pub description: String,
    pub status: TournamentStatus,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub start_date: DateTime<Utc>,

    #[serde(
        default,
        with = "bson::serde_helpers::chrono_datetime_as_bson_datetime_optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub participants: Vec<Participant>,
    pub max_participants: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prize_pool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<String>,
    pub bracket_type: String,
    #[serde(default)]
    pub matches: Vec<Match>,
    #[serde(default)]
    pub featured: bool,
    pub organizer_id: String,
    pub organizer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sponsor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sponsor_logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_instructions: Option<String>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Participant {
    /// Roster entry for a registering user. Name and avatar are snapshotted
    /// from the profile at registration time and never re-synced.
    pub fn from_profile(
        user_id: &str,
        display_name: &str,
        photo_url: Option<String>,
        details: JoinTournament,
    ) -> Self {
        Participant {
            id: user_id.to_string(),
            name: display_name.to_string(),
            avatar_url: photo_url,
            game_username: details.game_username,
            in_game_id: details.in_game_id,
            contact_email: details.contact_email,
            registered_at: Utc::now(),
        }
    }
}

impl Tournament {
    pub fn is_registered(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p.id == user_id)
    }

    /// Join preconditions, checked in order: not already on the roster,
    /// registration still open, and a free slot while the tournament is
    /// Upcoming. Live tournaments take late registrations past the cap.
    pub fn check_join(&self, user_id: &str) -> Result<(), RegistrationError> {
        if self.is_registered(user_id) {
            return Err(RegistrationError::AlreadyRegistered);
        }
        if !self.status.registration_open() {
            return Err(RegistrationError::Closed);
        }
        if self.status == TournamentStatus::Upcoming
            && self.participants.len() as u32 >= self.max_participants
        {
            return Err(RegistrationError::Full);
        }
        Ok(())
    }

    /// Room code/password stay locked until the start is at most
    /// [`ROOM_DETAILS_WINDOW_MINUTES`] away.
    pub fn room_details_unlocked(&self, now: DateTime<Utc>) -> bool {
        now >= self.start_date - Duration::minutes(ROOM_DETAILS_WINDOW_MINUTES)
    }
}

/// Dashboard "featured tournament" cascade:
/// 1. earliest-starting among explicitly flagged featured, active tournaments;
/// 2. failing that, earliest-starting among all active tournaments;
/// 3. failing that, the most recently created tournament overall.
pub fn select_featured(tournaments: &[Tournament]) -> Option<&Tournament> {
    tournaments
        .iter()
        .filter(|t| t.featured && t.status.is_active())
        .min_by_key(|t| t.start_date)
        .or_else(|| {
            tournaments
                .iter()
                .filter(|t| t.status.is_active())
                .min_by_key(|t| t.start_date)
        })
        .or_else(|| tournaments.iter().max_by_key(|t| t.created_at))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTournament {
    #[validate(length(min = 3, max = 120))]
    pub name: String,
    pub game_id: String,
    #[validate(url)]
    pub banner_image_url: Option<String>,
    #[validate(length(max = 5000))]
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    #[validate(range(min = 2, max = 1024))]
    pub max_participants: u32,
    pub prize_pool: Option<String>,
    #[validate(length(max = 10000))]
    pub rules: Option<String>,
    pub bracket_type: String,
    pub entry_fee: Option<f64>,
    pub currency: Option<String>,
    pub sponsor_name: Option<String>,
    #[validate(url)]
    pub sponsor_logo_url: Option<String>,
    #[validate(length(max = 2000))]
    pub registration_instructions: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct JoinTournament {
    #[validate(length(min = 1, max = 60))]
    pub game_username: Option<String>,
    #[validate(length(min = 1, max = 60))]
    pub in_game_id: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoomDetails {
    pub room_code: String,
    pub room_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatus {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct SetFeatured {
    pub featured: bool,
}

#[derive(Debug, Deserialize)]
pub struct TournamentQuery {
    pub status: Option<String>,
    pub game_id: Option<String>,
    pub participant_id: Option<String>,
    pub featured: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(id: &str) -> Participant {
        Participant {
            id: id.to_string(),
            name: format!("player-{id}"),
            avatar_url: None,
            game_username: None,
            in_game_id: None,
            contact_email: None,
            registered_at: Utc::now(),
        }
    }

    fn tournament(status: TournamentStatus, max: u32, roster: &[&str]) -> Tournament {
        Tournament {
            id: Some(ObjectId::new()),
            name: "BGMI Clash".to_string(),
            game_id: "g1".to_string(),
            game_name: "BGMI".to_string(),
            game_icon_url: "https://img.example/bgmi.png".to_string(),
            banner_image_url: None,
            description: String::new(),
            status,
            start_date: Utc::now() + Duration::days(1),
            end_date: None,
            participants: roster.iter().map(|id| participant(id)).collect(),
            max_participants: max,
            prize_pool: None,
            rules: None,
            bracket_type: "Single Elimination".to_string(),
            matches: Vec::new(),
            featured: false,
            organizer_id: "org".to_string(),
            organizer: "Organizer".to_string(),
            entry_fee: None,
            currency: None,
            room_code: None,
            room_password: None,
            sponsor_name: None,
            sponsor_logo_url: None,
            registration_instructions: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn join_allowed_with_free_slot() {
        let t = tournament(TournamentStatus::Upcoming, 4, &["u1", "u2"]);
        assert_eq!(t.check_join("u3"), Ok(()));
    }

    #[test]
    fn join_rejects_duplicate_registration() {
        let t = tournament(TournamentStatus::Upcoming, 4, &["u1", "u2"]);
        assert_eq!(t.check_join("u2"), Err(RegistrationError::AlreadyRegistered));
    }

    #[test]
    fn join_rejects_full_upcoming_tournament() {
        let t = tournament(TournamentStatus::Upcoming, 2, &["u1", "u2"]);
        assert_eq!(t.check_join("u3"), Err(RegistrationError::Full));
    }

    #[test]
    fn join_skips_capacity_check_when_live() {
        let t = tournament(TournamentStatus::Live, 2, &["u1", "u2"]);
        assert_eq!(t.check_join("u3"), Ok(()));
    }

    #[test]
    fn join_rejects_closed_tournament_regardless_of_capacity() {
        let completed = tournament(TournamentStatus::Completed, 10, &["u1"]);
        assert_eq!(completed.check_join("u3"), Err(RegistrationError::Closed));

        let cancelled = tournament(TournamentStatus::Cancelled, 10, &[]);
        assert_eq!(cancelled.check_join("u3"), Err(RegistrationError::Closed));
    }

    #[test]
    fn duplicate_check_runs_before_closed_check() {
        let t = tournament(TournamentStatus::Completed, 10, &["u1"]);
        assert_eq!(t.check_join("u1"), Err(RegistrationError::AlreadyRegistered));
    }

    #[test]
    fn featured_flag_beats_earlier_start() {
        let mut a = tournament(TournamentStatus::Upcoming, 8, &[]);
        a.name = "A".to_string();
        a.featured = true;
        a.start_date = Utc::now() + Duration::days(5);

        let mut b = tournament(TournamentStatus::Live, 8, &[]);
        b.name = "B".to_string();
        b.start_date = Utc::now() + Duration::days(1);

        let all = vec![a, b];
        assert_eq!(select_featured(&all).unwrap().name, "A");
    }

    #[test]
    fn no_flags_falls_back_to_earliest_active() {
        let mut a = tournament(TournamentStatus::Upcoming, 8, &[]);
        a.name = "A".to_string();
        a.start_date = Utc::now() + Duration::days(5);

        let mut b = tournament(TournamentStatus::Live, 8, &[]);
        b.name = "B".to_string();
        b.start_date = Utc::now() + Duration::days(1);

        let all = vec![a, b];
        assert_eq!(select_featured(&all).unwrap().name, "B");
    }

    #[test]
    fn nothing_active_falls_back_to_most_recently_created() {
        let mut a = tournament(TournamentStatus::Completed, 8, &[]);
        a.name = "A".to_string();
        a.created_at = Utc::now() - Duration::days(10);

        let mut b = tournament(TournamentStatus::Cancelled, 8, &[]);
        b.name = "B".to_string();
        b.created_at = Utc::now() - Duration::days(2);

        let all = vec![a, b];
        assert_eq!(select_featured(&all).unwrap().name, "B");
    }

    #[test]
    fn featured_flag_on_finished_tournament_is_ignored() {
        let mut a = tournament(TournamentStatus::Completed, 8, &[]);
        a.name = "A".to_string();
        a.featured = true;

        let mut b = tournament(TournamentStatus::Upcoming, 8, &[]);
        b.name = "B".to_string();

        let all = vec![a, b];
        assert_eq!(select_featured(&all).unwrap().name, "B");
    }

    #[test]
    fn select_featured_on_empty_list_is_none() {
        assert!(select_featured(&[]).is_none());
    }

    #[test]
    fn room_details_locked_until_fifteen_minutes_before_start() {
        let mut t = tournament(TournamentStatus::Upcoming, 8, &[]);
        t.start_date = Utc::now() + Duration::hours(2);
        assert!(!t.room_details_unlocked(Utc::now()));

        t.start_date = Utc::now() + Duration::minutes(10);
        assert!(t.room_details_unlocked(Utc::now()));
    }

    #[test]
    fn end_date_round_trips_as_a_bson_datetime() {
        let mut t = tournament(TournamentStatus::Completed, 8, &[]);
        let ended = Utc::now();
        t.end_date = Some(ended);

        let doc = bson::to_document(&t).unwrap();
        assert!(matches!(doc.get("end_date"), Some(bson::Bson::DateTime(_))));

        let back: Tournament = bson::from_document(doc).unwrap();
        assert_eq!(
            back.end_date.map(|d| d.timestamp_millis()),
            Some(ended.timestamp_millis())
        );
    }

    #[test]
    fn missing_end_date_deserializes_as_none() {
        let t = tournament(TournamentStatus::Upcoming, 8, &[]);
        let doc = bson::to_document(&t).unwrap();
        assert!(!doc.contains_key("end_date"));

        let back: Tournament = bson::from_document(doc).unwrap();
        assert_eq!(back.end_date, None);
    }

    #[test]
    fn roster_entry_carries_the_profile_avatar() {
        let details = JoinTournament {
            game_username: Some("sniperx".to_string()),
            in_game_id: Some("5151234".to_string()),
            contact_email: None,
        };
        let p = Participant::from_profile(
            "u1",
            "Player One",
            Some("https://img.example/u1.png".to_string()),
            details,
        );
        assert_eq!(p.id, "u1");
        assert_eq!(p.name, "Player One");
        assert_eq!(p.avatar_url.as_deref(), Some("https://img.example/u1.png"));
        assert_eq!(p.game_username.as_deref(), Some("sniperx"));
    }

    #[test]
    fn roster_entry_without_a_profile_photo_has_no_avatar() {
        let details = JoinTournament {
            game_username: None,
            in_game_id: None,
            contact_email: None,
        };
        let p = Participant::from_profile("u2", "Player Two", None, details);
        assert_eq!(p.avatar_url, None);
    }

    #[test]
    fn status_round_trips_through_parse() {
        for s in ["Upcoming", "Live", "Ongoing", "Completed", "Cancelled"] {
            assert_eq!(TournamentStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(TournamentStatus::parse("Paused").is_none());
    }
}

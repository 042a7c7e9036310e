use std::collections::BTreeMap;

use mongodb::bson;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::tournament::{Participant, Tournament};

pub const SINGLE_ELIMINATION: &str = "Single Elimination";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchStatus {
    Scheduled,
    Live,
    Completed,
}

/// One bracket match, embedded in the tournament document. Admin-entered
/// results are written straight into `matches`; nothing advances winners
/// into later rounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: Uuid,
    pub round: u32,
    pub participants: [Option<Participant>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<bson::DateTime>,
    pub status: MatchStatus,
}

/// Best-effort round-1 pairing for a roster with no recorded matches:
/// adjacent participants are paired, an odd leftover sits the round out.
/// Pure derivation; the result is never persisted.
pub fn derive_round1(participants: &[Participant]) -> Vec<Match> {
    participants
        .chunks_exact(2)
        .map(|pair| Match {
            id: Uuid::new_v4(),
            round: 1,
            participants: [Some(pair[0].clone()), Some(pair[1].clone())],
            winner: None,
            score: None,
            start_time: None,
            status: MatchStatus::Scheduled,
        })
        .collect()
}

/// The display structure behind the bracket page: matches grouped by round.
/// Synthesizes round 1 only for single-elimination tournaments that have at
/// least two participants and no recorded matches.
pub fn bracket_view(tournament: &Tournament) -> BTreeMap<u32, Vec<Match>> {
    let mut rounds: BTreeMap<u32, Vec<Match>> = BTreeMap::new();

    if !tournament.matches.is_empty() {
        for m in &tournament.matches {
            rounds.entry(m.round).or_default().push(m.clone());
        }
        return rounds;
    }

    if tournament.bracket_type == SINGLE_ELIMINATION && tournament.participants.len() >= 2 {
        rounds.insert(1, derive_round1(&tournament.participants));
    }

    rounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tournament::TournamentStatus;
    use chrono::Utc;
    use mongodb::bson::oid::ObjectId;

    fn participant(id: &str) -> Participant {
        Participant {
            id: id.to_string(),
            name: id.to_uppercase(),
            avatar_url: None,
            game_username: None,
            in_game_id: None,
            contact_email: None,
            registered_at: Utc::now(),
        }
    }

    fn ids(m: &Match) -> (Option<&str>, Option<&str>) {
        (
            m.participants[0].as_ref().map(|p| p.id.as_str()),
            m.participants[1].as_ref().map(|p| p.id.as_str()),
        )
    }

    #[test]
    fn pairs_adjacent_participants() {
        let roster = vec![
            participant("p1"),
            participant("p2"),
            participant("p3"),
            participant("p4"),
        ];
        let matches = derive_round1(&roster);
        assert_eq!(matches.len(), 2);
        assert_eq!(ids(&matches[0]), (Some("p1"), Some("p2")));
        assert_eq!(ids(&matches[1]), (Some("p3"), Some("p4")));
        assert!(matches.iter().all(|m| m.round == 1));
        assert!(matches.iter().all(|m| m.winner.is_none()));
    }

    #[test]
    fn odd_leftover_gets_a_bye() {
        let roster = vec![participant("p1"), participant("p2"), participant("p3")];
        let matches = derive_round1(&roster);
        assert_eq!(matches.len(), 1);
        assert_eq!(ids(&matches[0]), (Some("p1"), Some("p2")));
    }

    #[test]
    fn fewer_than_two_participants_yields_no_matches() {
        assert!(derive_round1(&[]).is_empty());
        assert!(derive_round1(&[participant("p1")]).is_empty());
    }

    #[test]
    fn synthesis_is_deterministic_for_a_fixed_roster() {
        let roster = vec![participant("p1"), participant("p2")];
        let a = derive_round1(&roster);
        let b = derive_round1(&roster);
        assert_eq!(ids(&a[0]), ids(&b[0]));
    }

    fn tournament(bracket_type: &str, roster: Vec<Participant>, matches: Vec<Match>) -> Tournament {
        Tournament {
            id: Some(ObjectId::new()),
            name: "Test Cup".to_string(),
            game_id: "g1".to_string(),
            game_name: "Game".to_string(),
            game_icon_url: "https://img.example/g.png".to_string(),
            banner_image_url: None,
            description: String::new(),
            status: TournamentStatus::Upcoming,
            start_date: Utc::now(),
            end_date: None,
            participants: roster,
            max_participants: 16,
            prize_pool: None,
            rules: None,
            bracket_type: bracket_type.to_string(),
            matches,
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

    fn recorded_match(round: u32) -> Match {
        Match {
            id: Uuid::new_v4(),
            round,
            participants: [Some(participant("p1")), Some(participant("p2"))],
            winner: None,
            score: None,
            start_time: None,
            status: MatchStatus::Scheduled,
        }
    }

    #[test]
    fn recorded_matches_are_grouped_by_round_and_win_over_synthesis() {
        let t = tournament(
            SINGLE_ELIMINATION,
            vec![participant("p1"), participant("p2"), participant("p3")],
            vec![recorded_match(2), recorded_match(1), recorded_match(1)],
        );
        let view = bracket_view(&t);
        assert_eq!(view.len(), 2);
        assert_eq!(view[&1].len(), 2);
        assert_eq!(view[&2].len(), 1);
    }

    #[test]
    fn only_single_elimination_gets_synthesis() {
        let round_robin = tournament(
            "Round Robin",
            vec![participant("p1"), participant("p2")],
            Vec::new(),
        );
        assert!(bracket_view(&round_robin).is_empty());

        let single_elim = tournament(
            SINGLE_ELIMINATION,
            vec![participant("p1"), participant("p2")],
            Vec::new(),
        );
        let view = bracket_view(&single_elim);
        assert_eq!(view[&1].len(), 1);
    }
}

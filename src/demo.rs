use crate::state::{Player, TeamBundle};

/// Data shown when there is no saved state, no snapshot and no remote refresh yet.
pub fn demo_bundle() -> TeamBundle {
    TeamBundle {
        players: vec![Player {
            id: "demo-mario-rossi".to_string(),
            first_name: "Mario".to_string(),
            last_name: "Rossi".to_string(),
            number: 10,
            position: "Attaccante".to_string(),
            goals: 15,
            assists: 8,
            motm: 3,
            jersey_number: "10".to_string(),
            ..Player::default()
        }],
        events: Vec::new(),
    }
}

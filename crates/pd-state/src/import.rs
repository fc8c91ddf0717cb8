//! JSON import of participant and prize lists
//!
//! Accepts either a bare array or an object wrapping the array, trims text
//! fields and validates the result before handing it to the draw.

use std::path::Path;

use serde::Deserialize;

use pd_core::{Participant, PrizeTier, validate_participants, validate_tiers};

use crate::StateResult;

#[derive(Deserialize)]
#[serde(untagged)]
enum ParticipantFile {
    List(Vec<Participant>),
    Wrapped { participants: Vec<Participant> },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PrizeFile {
    List(Vec<PrizeTier>),
    Wrapped {
        #[serde(alias = "prizeTiers", alias = "prize_tiers")]
        prizes: Vec<PrizeTier>,
    },
}

/// Parse and validate a participant list
pub fn parse_participants(json: &str) -> StateResult<Vec<Participant>> {
    let participants: Vec<Participant> = match serde_json::from_str(json)? {
        ParticipantFile::List(list) => list,
        ParticipantFile::Wrapped { participants } => participants,
    };

    let participants: Vec<Participant> = participants
        .into_iter()
        .map(|p| Participant {
            id: p.id.trim().to_string(),
            name: p.name.trim().to_string(),
        })
        .collect();

    validate_participants(&participants)?;
    Ok(participants)
}

/// Parse and validate a prize tier list
pub fn parse_prize_tiers(json: &str) -> StateResult<Vec<PrizeTier>> {
    let tiers: Vec<PrizeTier> = match serde_json::from_str(json)? {
        PrizeFile::List(list) => list,
        PrizeFile::Wrapped { prizes } => prizes,
    };

    let tiers: Vec<PrizeTier> = tiers
        .into_iter()
        .map(|t| PrizeTier {
            name: t.name.trim().to_string(),
            localized_name: t
                .localized_name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            ..t
        })
        .collect();

    validate_tiers(&tiers)?;
    Ok(tiers)
}

/// Read and validate a participant file
pub fn load_participants<P: AsRef<Path>>(path: P) -> StateResult<Vec<Participant>> {
    let json = std::fs::read_to_string(path)?;
    parse_participants(&json)
}

/// Read and validate a prize file
pub fn load_prize_tiers<P: AsRef<Path>>(path: P) -> StateResult<Vec<PrizeTier>> {
    let json = std::fs::read_to_string(path)?;
    parse_prize_tiers(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StateError;
    use pd_core::DrawError;

    #[test]
    fn test_parse_participant_shapes() {
        let bare = parse_participants(r#"[{"id":" A ","name":"Alice "}]"#).unwrap();
        assert_eq!(bare[0].id, "A");
        assert_eq!(bare[0].name, "Alice");

        let wrapped =
            parse_participants(r#"{"participants":[{"id":"B","name":"Bob"}]}"#).unwrap();
        assert_eq!(wrapped.len(), 1);
    }

    #[test]
    fn test_duplicate_participants_rejected() {
        let result = parse_participants(
            r#"[{"id":"A","name":"Alice"},{"id":"A","name":"Alicia"}]"#,
        );
        assert!(matches!(
            result,
            Err(StateError::Draw(DrawError::Validation(_)))
        ));
    }

    #[test]
    fn test_blank_name_rejected_after_trim() {
        assert!(parse_participants(r#"[{"id":"A","name":"   "}]"#).is_err());
    }

    #[test]
    fn test_parse_prize_shapes() {
        let tiers = parse_prize_tiers(
            r#"{"prizeTiers":[{"id":1,"name":"Grand","localizedName":" ","quantity":1}]}"#,
        )
        .unwrap();
        assert_eq!(tiers[0].localized_name, None);

        let tiers = parse_prize_tiers(r#"[{"id":2,"name":"Second","quantity":3}]"#).unwrap();
        assert_eq!(tiers[0].quantity, 3);
    }

    #[test]
    fn test_out_of_range_quantity_rejected() {
        let result = parse_prize_tiers(r#"[{"id":2,"name":"Second","quantity":1001}]"#);
        assert!(matches!(result, Err(StateError::Draw(_))));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            parse_prize_tiers("{"),
            Err(StateError::Serialize(_))
        ));
    }
}

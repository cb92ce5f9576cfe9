use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Terminal punctuation followed by what looks like the start of another sentence
    static ref SENTENCE_BREAK: Regex = Regex::new(r#"[.!?]+["'”’)\]]*\s+["'“‘(]?[A-Z0-9]"#).unwrap();
    static ref PLAYER: Regex = Regex::new(r"(?i)\bplayers?\b").unwrap();
    static ref INVENTORY: Regex = Regex::new(r"(?i)\binventor(y|ies)\b").unwrap();
    static ref READER: Regex = Regex::new(r"(?i)\b(you|your|yours|yourself|one|one's)\b").unwrap();
}

/// Ways a hint can drift from the phrasing the prompt asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhrasingConcern {
    MultipleSentences,
    MentionsPlayer,
    MentionsInventory,
    NoSecondPersonOrImpersonal,
}

impl PhrasingConcern {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhrasingConcern::MultipleSentences => "multiple_sentences",
            PhrasingConcern::MentionsPlayer => "mentions_player",
            PhrasingConcern::MentionsInventory => "mentions_inventory",
            PhrasingConcern::NoSecondPersonOrImpersonal => "no_second_person",
        }
    }
}

/// Heuristic check of a generated hint. Results are advisory and never reject a hint.
pub fn review(hint: &str) -> Vec<PhrasingConcern> {
    let hint = hint.trim();
    let mut concerns = Vec::new();

    if SENTENCE_BREAK.is_match(hint) {
        concerns.push(PhrasingConcern::MultipleSentences);
    }
    if PLAYER.is_match(hint) {
        concerns.push(PhrasingConcern::MentionsPlayer);
    }
    if INVENTORY.is_match(hint) {
        concerns.push(PhrasingConcern::MentionsInventory);
    }
    if !READER.is_match(hint) {
        concerns.push(PhrasingConcern::NoSecondPersonOrImpersonal);
    }

    concerns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_hint_has_no_concerns() {
        assert!(review("Look for something nearby that could fit the lock, if you can.").is_empty());
        assert!(review("One might test how sturdy the rope is before trusting it.").is_empty());
    }

    #[test]
    fn flags_multiple_sentences() {
        let concerns = review("You should look around. The key is under the mat.");
        assert!(concerns.contains(&PhrasingConcern::MultipleSentences));
    }

    #[test]
    fn abbreviations_inside_a_sentence_are_not_breaks() {
        let concerns = review("You could try something sturdy, e.g. the rope you found earlier.");
        assert!(!concerns.contains(&PhrasingConcern::MultipleSentences));
    }

    #[test]
    fn flags_references_to_player_and_inventory() {
        let concerns = review("The player should check their inventory for a key.");
        assert_eq!(
            concerns,
            vec![
                PhrasingConcern::MentionsPlayer,
                PhrasingConcern::MentionsInventory,
                PhrasingConcern::NoSecondPersonOrImpersonal,
            ]
        );
    }

    #[test]
    fn concern_labels_are_stable() {
        assert_eq!(PhrasingConcern::MultipleSentences.as_str(), "multiple_sentences");
        assert_eq!(PhrasingConcern::NoSecondPersonOrImpersonal.as_str(), "no_second_person");
    }
}

use std::fmt::Write;

use crate::models::HintRequest;

pub const EMPTY_INVENTORY_LINE: &str = "The player has nothing in their inventory.";

const ROLE: &str = "You are the game master of TextQuest, a text adventure. A player is stuck \
and your job is to help them by giving a single hint.";

const INSTRUCTIONS: &str = "\
Generate a hint that helps the player make progress in the game.
The hint must be actionable and must not give away the solution directly.
The hint must not refer to the player or to their inventory directly. Address the reader as \"you\" or \"one\" instead.
The hint must be a single sentence.
Reply only with an object containing the field \"hint\".";

/// Builds the game-master prompt for one hint request.
///
/// The scene description and inventory items are embedded exactly as given.
pub fn render(request: &HintRequest) -> String {
    let mut prompt = String::with_capacity(
        ROLE.len()
            + INSTRUCTIONS.len()
            + request.scene_description.len()
            + request.inventory.iter().map(|item| item.len() + 3).sum::<usize>()
            + 128,
    );

    prompt.push_str(ROLE);
    prompt.push_str("\n\nHere is the description of the current scene:\n");
    prompt.push_str(&request.scene_description);
    prompt.push_str("\n\nHere is the player's current inventory:\n");

    if request.inventory.is_empty() {
        prompt.push_str(EMPTY_INVENTORY_LINE);
        prompt.push('\n');
    } else {
        for item in &request.inventory {
            // Writing into a String cannot fail
            let _ = writeln!(prompt, "- {}", item);
        }
    }

    prompt.push('\n');
    prompt.push_str(INSTRUCTIONS);
    prompt.push('\n');
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bullet_lines(prompt: &str) -> Vec<&str> {
        prompt.lines().filter(|line| line.starts_with("- ")).collect()
    }

    #[test]
    fn empty_inventory_uses_fallback_line() {
        let request = HintRequest::new("A locked door blocks the corridor.", Vec::<String>::new());
        let prompt = render(&request);

        assert!(prompt.contains(EMPTY_INVENTORY_LINE));
        assert!(bullet_lines(&prompt).is_empty());
    }

    #[test]
    fn inventory_items_render_in_order_one_per_line() {
        let request = HintRequest::new("A locked door blocks the corridor.", ["torch", "key"]);
        let prompt = render(&request);

        assert_eq!(bullet_lines(&prompt), vec!["- torch", "- key"]);
        assert!(prompt.contains("- torch\n- key\n"));
        assert!(!prompt.contains(EMPTY_INVENTORY_LINE));
    }

    #[test]
    fn scene_and_items_are_embedded_verbatim() {
        let scene = "The *ancient* door reads: {{open sesame}} & <nothing> else.";
        let request = HintRequest::new(scene, ["  rusty   key ", "map of \"the\" caves"]);
        let prompt = render(&request);

        assert!(prompt.contains(scene));
        assert!(prompt.contains("-   rusty   key \n"));
        assert!(prompt.contains("- map of \"the\" caves\n"));
    }

    #[test]
    fn prompt_states_role_and_constraints() {
        let prompt = render(&HintRequest::new("You stand before a chasm.", ["rope"]));

        assert!(prompt.starts_with("You are the game master"));
        assert!(prompt.contains("single sentence"));
        assert!(prompt.contains("\"you\" or \"one\""));
        assert_eq!(bullet_lines(&prompt), vec!["- rope"]);
    }

    #[test]
    fn rendering_is_deterministic() {
        let request = HintRequest::new("You stand before a chasm.", ["rope"]);
        assert_eq!(render(&request), render(&request));
    }
}

use crate::types::Role;

/// Ordered transcript flattened into a single prompt for each request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    turns: Vec<(Role, String)>,
}

impl Conversation {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            turns: vec![(Role::System, system_prompt.into())],
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push((Role::User, content.into()));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.turns.push((Role::Assistant, content.into()));
    }

    pub fn turns(&self) -> &[(Role, String)] {
        &self.turns
    }

    pub fn render_prompt(&self) -> String {
        self.turns
            .iter()
            .map(|(role, content)| format!("[{}]: {}", label(*role), content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn label(role: Role) -> &'static str {
    match role {
        Role::System => "System",
        Role::User => "User",
        Role::Assistant => "Assistant",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_turns_in_order() {
        let mut conversation = Conversation::new("You are a helpful productivity AI assistant.");
        conversation.push_user("Total tasks/events: 2");
        conversation.push_assistant("Batch your study blocks.");
        conversation.push_user("What about weekends?");

        assert_eq!(
            conversation.render_prompt(),
            "[System]: You are a helpful productivity AI assistant.\n\n\
             [User]: Total tasks/events: 2\n\n\
             [Assistant]: Batch your study blocks.\n\n\
             [User]: What about weekends?"
        );
        assert_eq!(conversation.turns().len(), 4);
    }

    #[test]
    fn fresh_conversation_holds_only_the_system_turn() {
        let conversation = Conversation::new("sys");
        assert_eq!(conversation.render_prompt(), "[System]: sys");
    }
}

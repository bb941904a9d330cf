use std::collections::HashMap;

use llm::TemplateVars;

pub mod llm;

pub const DEFAULT_OPENING_PROMPT: &str =
    "The player has approached {{NPCName}} and initiated conversation. Greet them.";

fn default_opening_prompt() -> String {
    DEFAULT_OPENING_PROMPT.to_string()
}

/// The NPC on the other side of the wheel.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Npc {
    pub name: String,

    /// First message sent when a conversation starts.
    #[serde(default = "default_opening_prompt")]
    pub opening_prompt: String,

    /// Merged into every request's template variables.
    #[serde(default)]
    pub extra_vars: HashMap<String, String>,
}

impl Default for Npc {
    fn default() -> Self {
        Self {
            name: "NPC".to_string(),
            opening_prompt: default_opening_prompt(),
            extra_vars: HashMap::new(),
        }
    }
}

impl Npc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Extras first, then the built-in names so they always win.
    pub fn template_vars(&self, player_name: &str) -> TemplateVars {
        let mut vars = self.extra_vars.clone();
        vars.insert("NPCName".to_string(), self.name.clone());
        vars.insert("PlayerName".to_string(), player_name.to_string());
        vars
    }
}

use std::fmt::Display;

/// Emotional framing of a player response, Paragon / Neutral / Renegade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum DialogueTone {
    #[serde(rename = "paragon")]
    Paragon,
    #[default]
    #[serde(rename = "neutral")]
    Neutral,
    #[serde(rename = "renegade")]
    Renegade,
}

impl Display for DialogueTone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tone = self.as_ref();
        write!(f, "{tone}")
    }
}

impl AsRef<str> for DialogueTone {
    fn as_ref(&self) -> &str {
        match self {
            DialogueTone::Paragon => "paragon",
            DialogueTone::Neutral => "neutral",
            DialogueTone::Renegade => "renegade",
        }
    }
}

/// One selectable response on the wheel.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct DialogueOption {
    /// Short text shown on the wheel.
    pub label: String,
    pub tone: DialogueTone,
    /// What is actually said to the NPC when picked. May be empty, in which
    /// case the label is sent instead.
    pub full_response: String,
}

impl DialogueOption {
    pub fn new(label: impl Into<String>, tone: DialogueTone, full_response: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            tone,
            full_response: full_response.into(),
        }
    }

    /// Text sent to the chat backend when this option is chosen.
    pub fn message(&self) -> &str {
        if self.full_response.is_empty() {
            &self.label
        } else {
            &self.full_response
        }
    }
}

/// A complete NPC turn: what the NPC said plus the player's options.
///
/// Options are in wheel order. When `is_goodbye` is set the last option ends
/// the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct DialogueLine {
    pub npc_text: String,
    pub options: Vec<DialogueOption>,
    pub is_goodbye: bool,
}

impl DialogueLine {
    /// True when `index` is the conversation-ending option of this line.
    pub fn is_goodbye_option(&self, index: usize) -> bool {
        self.is_goodbye && index + 1 == self.options.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum DialogueState {
    #[default]
    Inactive,
    /// A chat request is outstanding.
    WaitingForNPC,
    /// A line is on screen and the player has to pick an option.
    PlayerChoosing,
    /// Reserved. Nothing transitions here.
    Ending,
}

impl Display for DialogueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self {
            DialogueState::Inactive => "Inactive",
            DialogueState::WaitingForNPC => "Waiting for NPC",
            DialogueState::PlayerChoosing => "Player Choosing",
            DialogueState::Ending => "Ending",
        };
        write!(f, "{state}")
    }
}

use crate::{
    chat::{ChatBackend, ChatResponse},
    sys::{llm::TemplateVars, Npc},
};

use super::{
    event::DialogueObserver,
    parser::parse_response,
    prompt::DIALOGUE_SYSTEM_PROMPT,
    types::{DialogueLine, DialogueOption, DialogueState, DialogueTone},
};

/// Drives one conversation with one NPC.
///
/// ```text
/// Inactive --start--> WaitingForNPC --response--> PlayerChoosing
///    ^                      ^                          |
///    |                      +-------select_option------+
///    +----------------end / goodbye option-------------+
/// ```
///
/// Chat completions are accepted only while `WaitingForNPC`. Anything that
/// arrives in another state is a leftover from an ended conversation and is
/// dropped.
pub struct DialogueMachine {
    npc: Npc,
    state: DialogueState,
    current_line: DialogueLine,
    player_name: String,
    backend: Option<Box<dyn ChatBackend>>,
    observers: Vec<Box<dyn DialogueObserver>>,
}

impl DialogueMachine {
    pub fn new(npc: Npc) -> Self {
        Self {
            npc,
            state: DialogueState::Inactive,
            current_line: DialogueLine::default(),
            player_name: String::new(),
            backend: None,
            observers: Vec::new(),
        }
    }

    pub fn initialize(&mut self, backend: Box<dyn ChatBackend>) {
        self.backend = Some(backend);
    }

    pub fn add_observer(&mut self, observer: Box<dyn DialogueObserver>) {
        self.observers.push(observer);
    }

    pub fn state(&self) -> DialogueState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != DialogueState::Inactive
    }

    pub fn current_line(&self) -> &DialogueLine {
        &self.current_line
    }

    pub fn npc_name(&self) -> &str {
        &self.npc.name
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn template_vars(&self) -> TemplateVars {
        self.npc.template_vars(&self.player_name)
    }

    pub fn start(&mut self, player_name: &str) {
        if self.state != DialogueState::Inactive {
            log::warn!("start: dialogue with {} already active", self.npc.name);
            return;
        }

        if self.backend.is_none() {
            log::error!("start: no chat backend for {}", self.npc.name);
            return;
        }

        self.player_name = player_name.to_string();
        let vars = self.template_vars();

        if let Some(backend) = self.backend.as_mut() {
            // every conversation starts from a blank history
            backend.clear_history();
            backend.set_use_conversation_history(true);
        }

        self.set_state(DialogueState::WaitingForNPC);

        if let Some(backend) = self.backend.as_mut() {
            backend.chat_with_system(DIALOGUE_SYSTEM_PROMPT, &self.npc.opening_prompt, &vars);
        }
        log::info!("dialogue started: {} <-> {}", self.npc.name, self.player_name);
    }

    pub fn select_option(&mut self, index: usize) {
        if self.state != DialogueState::PlayerChoosing {
            log::warn!("select_option: not choosing (state {:?})", self.state);
            return;
        }

        let Some(option) = self.current_line.options.get(index) else {
            log::warn!(
                "select_option: invalid option index {index} (have {} options)",
                self.current_line.options.len()
            );
            return;
        };

        let message = option.message().to_string();

        // the goodbye option never reaches the backend
        if self.current_line.is_goodbye_option(index) {
            self.end();
            return;
        }

        if self.backend.is_none() {
            log::error!("select_option: no chat backend for {}", self.npc.name);
            return;
        }
        let vars = self.template_vars();

        self.set_state(DialogueState::WaitingForNPC);

        if let Some(backend) = self.backend.as_mut() {
            backend.chat(&message, &vars);
        }
    }

    pub fn end(&mut self) {
        if self.state == DialogueState::Inactive {
            return;
        }

        if let Some(backend) = self.backend.as_mut() {
            backend.cancel_all_requests();
        }

        self.current_line = DialogueLine::default();
        self.player_name.clear();

        self.set_state(DialogueState::Inactive);
        for observer in &mut self.observers {
            observer.on_dialogue_ended();
        }
        log::info!("dialogue with {} ended", self.npc.name);
    }

    /// Completion callback for requests issued by `start` and `select_option`.
    pub fn on_response_received(&mut self, response: ChatResponse) {
        if self.state != DialogueState::WaitingForNPC {
            log::debug!("ignoring chat response in state {:?}", self.state);
            return;
        }

        self.current_line = if response.is_success {
            parse_response(&response.content)
        } else {
            log::warn!("chat backend error: {}", response.error_message);
            Self::error_line(&response.error_message)
        };

        self.set_state(DialogueState::PlayerChoosing);
        for observer in &mut self.observers {
            observer.on_dialogue_line_ready(&self.npc.name, &self.current_line);
        }
    }

    /// Line shown when the backend failed. Its only option leaves.
    fn error_line(error_message: &str) -> DialogueLine {
        DialogueLine {
            npc_text: format!("(I seem to have lost my train of thought... [{error_message}])"),
            options: vec![DialogueOption::new("Leave", DialogueTone::Neutral, "")],
            is_goodbye: true,
        }
    }

    fn set_state(&mut self, new_state: DialogueState) {
        if self.state == new_state {
            return;
        }
        self.state = new_state;
        for observer in &mut self.observers {
            observer.on_dialogue_state_changed(new_state);
        }
    }
}

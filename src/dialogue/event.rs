use super::types::{DialogueLine, DialogueState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueEvent {
    LineReady { npc_name: String, line: DialogueLine },
    StateChanged(DialogueState),
    Ended,
}

/// Listener for conversation updates. Called synchronously on the thread
/// that drives the [`DialogueMachine`](super::machine::DialogueMachine).
pub trait DialogueObserver {
    fn on_dialogue_line_ready(&mut self, _npc_name: &str, _line: &DialogueLine) {}

    fn on_dialogue_state_changed(&mut self, _new_state: DialogueState) {}

    fn on_dialogue_ended(&mut self) {}
}

/// Forwards every notification as a [`DialogueEvent`]. A dropped receiver is
/// not an error.
impl DialogueObserver for crossbeam::channel::Sender<DialogueEvent> {
    fn on_dialogue_line_ready(&mut self, npc_name: &str, line: &DialogueLine) {
        let _ = self.send(DialogueEvent::LineReady {
            npc_name: npc_name.to_string(),
            line: line.clone(),
        });
    }

    fn on_dialogue_state_changed(&mut self, new_state: DialogueState) {
        let _ = self.send(DialogueEvent::StateChanged(new_state));
    }

    fn on_dialogue_ended(&mut self) {
        let _ = self.send(DialogueEvent::Ended);
    }
}

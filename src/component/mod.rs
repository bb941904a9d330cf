use std::time::Duration;

use chat::{Speaker, TranscriptComponent};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    style::Stylize,
    widgets::{Block, Paragraph, Wrap},
    Frame, Terminal,
};
use wheel::WheelComponent;

use crate::{
    chat::im_channel::ResponseRx,
    dialogue::{DialogueEvent, DialogueMachine, DialogueState},
};

pub mod chat;
pub mod wheel;

#[derive(Debug)]
pub enum Input {
    Event(Event),
    Dialogue(DialogueEvent),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Output {
    Exit,
    Select(usize),
    End,
    Start,
    Normal,
}

/// Terminal dialogue wheel.
pub struct App {
    pub machine: DialogueMachine,
    pub responses: ResponseRx,
    pub events: crossbeam::channel::Receiver<DialogueEvent>,
    pub player_name: String,

    transcript: TranscriptComponent,
    wheel: WheelComponent,
    npc_text: String,
    state: DialogueState,
    exit_n: u8,
}

impl App {
    pub fn new(
        machine: DialogueMachine,
        responses: ResponseRx,
        events: crossbeam::channel::Receiver<DialogueEvent>,
        player_name: String,
    ) -> Self {
        Self {
            state: machine.state(),
            machine,
            responses,
            events,
            player_name,
            transcript: TranscriptComponent::new(),
            wheel: WheelComponent::new(),
            npc_text: String::new(),
            exit_n: 0,
        }
    }

    pub fn render(&mut self, f: &mut Frame) {
        let vertical = Layout::vertical([
            Constraint::Min(5),
            Constraint::Length(6),
            Constraint::Length(10),
            Constraint::Length(1),
            Constraint::Length(1),
        ]);

        let [transcript_area, npc_area, wheel_area, status_area, help_area] =
            vertical.areas(f.size());

        self.transcript.render(f, transcript_area);

        let npc = Paragraph::new(self.npc_text.as_str())
            .wrap(Wrap { trim: true })
            .block(Block::bordered().title(self.machine.npc_name().to_string()).gray());
        f.render_widget(npc, npc_area);

        self.wheel.render(self.state, f, wheel_area);

        let status = Paragraph::new(format!(
            "{} | {}",
            self.machine.npc_name(),
            self.state
        ));
        f.render_widget(status, status_area);

        let help_message = Paragraph::new(
            "help: [1-9/Enter choose] [Ctrl+S start] [Ctrl+E end] [Esc+Esc quit]",
        );
        f.render_widget(help_message, help_area);
    }

    fn handle_dialogue_event(&mut self, event: DialogueEvent) {
        match event {
            DialogueEvent::LineReady { npc_name, line } => {
                self.transcript
                    .push(Speaker::Npc(npc_name), line.npc_text.clone());
                self.npc_text = line.npc_text.clone();
                self.wheel.set_line(line);
            }
            DialogueEvent::StateChanged(state) => {
                self.state = state;
                if state == DialogueState::WaitingForNPC {
                    self.wheel.clear();
                }
            }
            DialogueEvent::Ended => {
                self.wheel.clear();
                self.npc_text.clear();
                self.transcript
                    .push(Speaker::Notice, "Conversation ended.");
            }
        }
    }

    pub fn handler_input(&mut self, input: Input) -> Output {
        match input {
            Input::Event(Event::Key(key)) if key.code == KeyCode::Esc => {
                self.exit_n += 2;
                if self.exit_n >= 3 {
                    return Output::Exit;
                }
                return Output::Normal;
            }
            Input::Event(Event::Key(key))
                if key.code == KeyCode::Char('e') && key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                return Output::End;
            }
            Input::Event(Event::Key(key))
                if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                return Output::Start;
            }
            Input::Event(Event::Key(key)) => {
                self.exit_n = self.exit_n.max(1) - 1;
                match key.code {
                    KeyCode::Char(c @ '1'..='9') => {
                        return Output::Select(c as usize - '1' as usize);
                    }
                    KeyCode::Up => self.wheel.select_previous(),
                    KeyCode::Down => self.wheel.select_next(),
                    KeyCode::Enter => {
                        if let Some(i) = self.wheel.selected() {
                            return Output::Select(i);
                        }
                    }
                    _ => {}
                }
            }
            Input::Dialogue(event) => self.handle_dialogue_event(event),
            input => self.transcript.handler_input(input),
        }
        Output::Normal
    }

    fn select(&mut self, index: usize) {
        let chosen = self.wheel.option(index).cloned();
        let was_choosing = self.machine.state() == DialogueState::PlayerChoosing;

        self.machine.select_option(index);

        if let Some(option) = chosen {
            if was_choosing && self.machine.state() != DialogueState::PlayerChoosing {
                self.transcript
                    .push(Speaker::Player(self.player_name.clone()), option.message());
            }
        }
    }

    /// Feeds completions and dialogue events to their handlers. Returns true
    /// when anything changed.
    fn pump(&mut self) -> bool {
        let mut changed = false;
        while let Ok(response) = self.responses.try_recv() {
            self.machine.on_response_received(response);
            changed = true;
        }
        while let Ok(event) = self.events.try_recv() {
            self.handler_input(Input::Dialogue(event));
            changed = true;
        }
        changed
    }

    pub fn run_loop(mut self) -> anyhow::Result<()> {
        // setup terminal
        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let mut main_loop = || -> anyhow::Result<()> {
            let player_name = self.player_name.clone();
            self.machine.start(&player_name);

            loop {
                self.pump();
                terminal.draw(|f| self.render(f))?;

                if !event::poll(Duration::from_millis(50))? {
                    continue;
                }

                match self.handler_input(Input::Event(event::read()?)) {
                    Output::Exit => break,
                    Output::Select(i) => self.select(i),
                    Output::End => self.machine.end(),
                    Output::Start => self.machine.start(&player_name),
                    Output::Normal => {}
                }
            }

            self.machine.end();
            Ok(())
        };

        let r = main_loop();

        // restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        r
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEvent, KeyModifiers};

    use crate::{
        chat::{worker::WorkerChat, ChatResponse},
        debug_tool::echo_assistant,
        sys::Npc,
    };

    use super::*;

    fn app() -> (App, crossbeam::channel::Sender<ChatResponse>) {
        let (chat, _worker_rx) = WorkerChat::spawn(echo_assistant);
        let (response_tx, response_rx) = crossbeam::channel::unbounded();
        let (event_tx, event_rx) = crossbeam::channel::unbounded();

        let mut machine = DialogueMachine::new(Npc::new("Garrus"));
        machine.initialize(Box::new(chat));
        machine.add_observer(Box::new(event_tx));

        let app = App::new(machine, response_rx, event_rx, "Shepard".to_string());
        (app, response_tx)
    }

    fn key(code: KeyCode) -> Input {
        Input::Event(Event::Key(KeyEvent::new(code, KeyModifiers::empty())))
    }

    fn ctrl(c: char) -> Input {
        Input::Event(Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)))
    }

    #[test]
    fn keys_map_to_outputs() {
        let (mut app, _tx) = app();
        assert_eq!(app.handler_input(key(KeyCode::Char('2'))), Output::Select(1));
        assert_eq!(app.handler_input(ctrl('e')), Output::End);
        assert_eq!(app.handler_input(ctrl('s')), Output::Start);
        assert_eq!(app.handler_input(key(KeyCode::Char('x'))), Output::Normal);
    }

    #[test]
    fn double_escape_exits() {
        let (mut app, _tx) = app();
        assert_eq!(app.handler_input(key(KeyCode::Esc)), Output::Normal);
        assert_eq!(app.handler_input(key(KeyCode::Esc)), Output::Exit);
    }

    #[test]
    fn line_ready_fills_wheel_and_transcript() {
        let (mut app, tx) = app();
        app.machine.start("Shepard");
        tx.send(ChatResponse::success(
            "Shepard!\n[OPTIONS]\n[PARAGON] Hi | Good to see you.\n[GOODBYE] Bye",
        ))
        .unwrap();

        assert!(app.pump());

        assert_eq!(app.state, DialogueState::PlayerChoosing);
        assert_eq!(app.npc_text, "Shepard!");
        assert_eq!(app.wheel.option(0).map(|o| o.label.as_str()), Some("Hi"));
        assert_eq!(
            app.transcript.entries.last().map(|e| e.speaker.clone()),
            Some(Speaker::Npc("Garrus".to_string()))
        );

        app.select(0);
        assert_eq!(app.machine.state(), DialogueState::WaitingForNPC);
        let last = app.transcript.entries.last().unwrap();
        assert_eq!(last.speaker, Speaker::Player("Shepard".to_string()));
        assert_eq!(last.text, "Good to see you.");
    }

    #[test]
    fn ended_clears_wheel() {
        let (mut app, tx) = app();
        app.machine.start("Shepard");
        tx.send(ChatResponse::success("No options here.")).unwrap();
        app.pump();

        // fallback line: Continue..., Goodbye
        app.select(1);
        app.pump();

        assert_eq!(app.state, DialogueState::Inactive);
        assert!(app.wheel.option(0).is_none());
        assert!(app.npc_text.is_empty());
    }
}

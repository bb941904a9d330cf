use std::io::Write;

use crate::{
    chat::im_channel::ResponseRx,
    dialogue::{DialogueEvent, DialogueMachine},
    sys::llm::{Content, Role},
};

/// Offline generator: the NPC repeats the last thing it was told and offers
/// one option per tag.
pub fn echo_assistant(prompts: &[Content]) -> anyhow::Result<String> {
    let said = prompts
        .iter()
        .rev()
        .find(|c| c.role == Role::User)
        .map(|c| c.message.trim())
        .unwrap_or_default();

    Ok(format!(
        "You said: \"{said}\"\n\n\
         [OPTIONS]\n\
         [PARAGON] Agree warmly | I'm glad we understand each other.\n\
         [NEUTRAL] Ask more | Tell me more about that.\n\
         [RENEGADE] Scoff | I don't have time for this.\n\
         [GOODBYE] Leave"
    ))
}

enum Command {
    Exit,
    End,
    Start,
    Select(usize),
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.starts_with("exit!") {
            return Command::Exit;
        }
        match line {
            "end!" => Command::End,
            "start!" => Command::Start,
            n => match n.parse::<usize>() {
                // options are shown 1-based
                Ok(n) if n > 0 => Command::Select(n - 1),
                _ => Command::Unknown(n.to_string()),
            },
        }
    }
}

/// Line-mode front end: prints each NPC line and reads option numbers from
/// stdin.
pub struct TerminalApp {
    pub machine: DialogueMachine,
    pub responses: ResponseRx,
    pub events: crossbeam::channel::Receiver<DialogueEvent>,
    pub player_name: String,
}

impl TerminalApp {
    fn listen_user_input(tx: crossbeam::channel::Sender<String>) {
        let stdin = std::io::stdin();
        loop {
            let mut line = String::new();
            match stdin.read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            if tx.send(line).is_err() {
                break;
            }
        }
    }

    fn print_events(&self) -> anyhow::Result<()> {
        let mut stdout = std::io::stdout().lock();
        for event in self.events.try_iter() {
            match event {
                DialogueEvent::LineReady { npc_name, line } => {
                    writeln!(stdout, "\n{npc_name}: {}", line.npc_text)?;
                    for (i, option) in line.options.iter().enumerate() {
                        writeln!(stdout, "  {}. [{}] {}", i + 1, option.tone, option.label)?;
                    }
                }
                DialogueEvent::StateChanged(state) => {
                    log::debug!("dialogue state: {state}");
                }
                DialogueEvent::Ended => {
                    writeln!(stdout, "-- conversation ended (start! to talk again, exit! to quit)")?;
                }
            }
        }
        stdout.flush()?;
        Ok(())
    }

    pub fn run_loop(mut self) -> anyhow::Result<()> {
        let (input_tx, input_rx) = crossbeam::channel::unbounded();
        std::thread::spawn(move || Self::listen_user_input(input_tx));

        self.machine.start(&self.player_name);

        loop {
            self.print_events()?;

            crossbeam::select! {
                recv(input_rx) -> input => {
                    let Ok(input) = input else {
                        break;
                    };
                    match Command::parse(&input) {
                        Command::Exit => break,
                        Command::End => self.machine.end(),
                        Command::Start => self.machine.start(&self.player_name),
                        Command::Select(index) => self.machine.select_option(index),
                        Command::Unknown(s) => {
                            println!("unknown input {s:?}: type an option number, end!, start! or exit!");
                        }
                    }
                }
                recv(self.responses) -> response => {
                    let Ok(response) = response else {
                        break;
                    };
                    self.machine.on_response_received(response);
                }
            }
        }

        self.machine.end();
        Ok(())
    }
}

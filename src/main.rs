use std::{error::Error, time::Duration};

use anyhow::anyhow;
use chat::worker::WorkerChat;
use clap::Parser;
use dialogue::DialogueMachine;
use sys::Npc;

mod chat;
mod component;
mod debug_tool;
mod dialogue;
mod llm;
mod sys;

#[derive(Debug, clap::Parser)]
struct Args {
    #[arg(long, short, required = true)]
    project_path: String,

    #[arg(long, default_value = "Player")]
    player_name: String,

    /// line mode instead of the dialogue wheel
    #[arg(long)]
    debug_ui: bool,

    /// offline echo replies instead of the model
    #[arg(long)]
    debug_llm: bool,
}

#[derive(Debug, Clone, serde::Deserialize)]
struct Project {
    npc: Npc,
    #[serde(default)]
    run: RunOptions,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct RunOptions {
    #[serde(default)]
    base_url: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    temperature: Option<f32>,
    #[serde(default)]
    timeout_secs: u64,
}

impl RunOptions {
    fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(0.8)
    }

    fn fill_default_value(&mut self) {
        if self.base_url.is_empty() {
            self.base_url = "http://localhost:11434".to_string();
        }
        if self.model.is_empty() {
            self.model = "llama3.2".to_string();
        }
        if self.timeout_secs == 0 {
            self.timeout_secs = 120;
        }
    }
}

fn load_project(project_path: &str) -> anyhow::Result<Project> {
    let project = std::fs::read_to_string(project_path)
        .map_err(|_| anyhow!("project file `{}` not found", project_path))?;
    parse_project(&project)
}

fn parse_project(project: &str) -> anyhow::Result<Project> {
    let mut project: Project =
        toml::from_str(project).map_err(|e| anyhow!("invalid project file: {e}"))?;
    project.run.fill_default_value();
    Ok(project)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Args::parse();
    let project = load_project(&cli.project_path)?;

    let (chat, responses) = if cli.debug_llm {
        WorkerChat::spawn(debug_tool::echo_assistant)
    } else {
        let run = &project.run;
        let generator = llm::ollama::OllamaGenerator::new(
            &run.base_url,
            &run.model,
            run.temperature(),
            Duration::from_secs(run.timeout_secs),
        )?;
        log::info!("using model {} at {}", run.model, run.base_url);
        WorkerChat::spawn(generator)
    };

    let (event_tx, events) = crossbeam::channel::unbounded();
    let mut machine = DialogueMachine::new(project.npc);
    machine.initialize(Box::new(chat));
    machine.add_observer(Box::new(event_tx));

    let res = if cli.debug_ui {
        debug_tool::TerminalApp {
            machine,
            responses,
            events,
            player_name: cli.player_name,
        }
        .run_loop()
    } else {
        component::App::new(machine, responses, events, cli.player_name).run_loop()
    };

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_project() {
        let project = parse_project(
            r#"
            [npc]
            name = "Garrus"
            opening_prompt = "{{PlayerName}} walks up to {{NPCName}}."
            [npc.extra_vars]
            Location = "Citadel"

            [run]
            base_url = "http://gpu-box:11434"
            model = "mistral"
            temperature = 0.3
            timeout_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(project.npc.name, "Garrus");
        assert_eq!(project.npc.opening_prompt, "{{PlayerName}} walks up to {{NPCName}}.");
        assert_eq!(project.npc.extra_vars["Location"], "Citadel");
        assert_eq!(project.run.base_url, "http://gpu-box:11434");
        assert_eq!(project.run.model, "mistral");
        assert_eq!(project.run.temperature(), 0.3);
        assert_eq!(project.run.timeout_secs, 30);
    }

    #[test]
    fn run_defaults_are_filled() {
        let project = parse_project("[npc]\nname = \"Wrex\"\n").unwrap();

        assert_eq!(project.npc.opening_prompt, sys::DEFAULT_OPENING_PROMPT);
        assert_eq!(project.run.base_url, "http://localhost:11434");
        assert_eq!(project.run.model, "llama3.2");
        assert_eq!(project.run.temperature(), 0.8);
        assert_eq!(project.run.timeout_secs, 120);
    }

    #[test]
    fn zero_temperature_is_kept() {
        let project = parse_project("[npc]\nname = \"Wrex\"\n[run]\ntemperature = 0.0\n").unwrap();
        assert_eq!(project.run.temperature(), 0.0);
    }

    #[test]
    fn npc_is_required() {
        assert!(parse_project("[run]\nmodel = \"x\"\n").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_project("/nonexistent/project.toml").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use pseudoview_core::actions::{self, perform, Action, HostUi};
use pseudoview_core::model::Address;
use pseudoview_core::session::{NavigationOutcome, ShowOutcome};
use pseudoview_core::tagged::TextPosition;
use pseudoview_core::Session;
use serde::{Deserialize, Serialize};

use crate::commands::{open_session, settle};

/// A recorded interaction, loaded from YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayScript {
    pub steps: Vec<ReplayStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ReplayStep {
    Show {
        name: String,
        #[serde(default)]
        force: bool,
    },
    Activate {
        line: usize,
        column: usize,
    },
    Back,
    Forward,
    Rename {
        line: usize,
        column: usize,
        to: String,
    },
    Comment {
        text: String,
    },
}

impl ReplayStep {
    fn describe(&self) -> String {
        match self {
            ReplayStep::Show { name, .. } => format!("show {name}"),
            ReplayStep::Activate { line, column } => format!("activate {line}:{column}"),
            ReplayStep::Back => "back".to_string(),
            ReplayStep::Forward => "forward".to_string(),
            ReplayStep::Rename { line, column, to } => format!("rename {line}:{column} -> {to}"),
            ReplayStep::Comment { .. } => "comment".to_string(),
        }
    }
}

/// What one step did, as seen from the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: String,
    pub visible: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub jumps: Vec<Address>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    pub steps: Vec<StepReport>,
    pub final_function: Option<String>,
    pub final_text: Option<String>,
}

/// Host that answers prompts from the script and records everything else.
#[derive(Debug, Default)]
pub struct ScriptedHost {
    answer: Option<String>,
    jumps: Vec<Address>,
    warnings: Vec<String>,
}

impl ScriptedHost {
    fn answering(answer: impl Into<String>) -> Self {
        Self { answer: Some(answer.into()), ..Self::default() }
    }
}

impl HostUi for ScriptedHost {
    fn jump_to(&mut self, address: Address) {
        self.jumps.push(address);
    }

    fn open_xrefs(&mut self, address: Address) {
        tracing::debug!(address, "xrefs requested");
    }

    fn open_calls(&mut self, address: Address) {
        tracing::debug!(address, "calls requested");
    }

    fn prompt_text(&mut self, _initial: &str, _label: &str) -> Option<String> {
        self.answer.take()
    }

    fn prompt_line(&mut self, _initial: &str, _label: &str) -> Option<String> {
        self.answer.take()
    }

    fn warn(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }
}

/// Parse a replay script from YAML text.
pub fn parse_script(yaml: &str) -> Result<ReplayScript> {
    serde_yaml::from_str(yaml).context("Failed to parse replay script YAML")
}

/// Run every step of `script` against `session`, settling redisplays in between.
pub fn run_script(session: &mut Session, script: &ReplayScript) -> ReplayReport {
    let steps = script.steps.iter().map(|step| run_step(session, step)).collect();
    let visible = session.visible();
    ReplayReport {
        steps,
        final_function: visible.map(|view| view.function.name.clone()),
        final_text: visible.map(|view| view.text.plain()),
    }
}

fn run_step(session: &mut Session, step: &ReplayStep) -> StepReport {
    let mut host = ScriptedHost::default();
    let note = match step {
        ReplayStep::Show { name, force } => match session.show_function(name, *force, false) {
            ShowOutcome::Scheduled { .. } => None,
            ShowOutcome::AlreadyShown { .. } => Some("already shown".to_string()),
            ShowOutcome::JumpToAsm { address } => {
                host.jump_to(address);
                None
            }
            ShowOutcome::Unknown => Some(format!("unknown function {name}")),
        },
        ReplayStep::Activate { line, column } => {
            perform(session, &mut host, Action::Activate, TextPosition::new(*line, *column));
            None
        }
        ReplayStep::Back => navigation_note(session.back()),
        ReplayStep::Forward => navigation_note(session.forward()),
        ReplayStep::Rename { line, column, to } => {
            host = ScriptedHost::answering(to.as_str());
            match actions::rename_at_cursor(session, &mut host, TextPosition::new(*line, *column)) {
                Ok(true) => None,
                Ok(false) => Some("nothing renamed".to_string()),
                Err(err) => {
                    actions::report(&mut host, &err);
                    None
                }
            }
        }
        ReplayStep::Comment { text } => {
            host = ScriptedHost::answering(text.as_str());
            perform(session, &mut host, Action::EditComment, TextPosition::default());
            None
        }
    };

    settle(session);
    tracing::debug!(step = %step.describe(), "replayed step");
    StepReport {
        step: step.describe(),
        visible: session.visible().map(|view| view.function.name.clone()),
        jumps: host.jumps,
        warnings: host.warnings,
        note,
    }
}

fn navigation_note(outcome: NavigationOutcome) -> Option<String> {
    match outcome {
        NavigationOutcome::Moved { .. } => None,
        NavigationOutcome::CannotMove => Some("cannot move".to_string()),
        NavigationOutcome::CacheMiss { address } => Some(format!("no cached code for {address:#x}")),
    }
}

/// Replay a YAML session script against the project at `root`.
pub fn replay_command(
    root: &str,
    code: &Path,
    decompiler: &str,
    script_path: &Path,
    json: bool,
) -> Result<()> {
    let yaml = fs::read_to_string(script_path)
        .with_context(|| format!("Failed to read replay script at {}", script_path.display()))?;
    let script = parse_script(&yaml)?;
    let mut session = open_session(root, code, decompiler)?;
    let report = run_script(&mut session, &script);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for (idx, step) in report.steps.iter().enumerate() {
        println!(
            "[{}] {} -> {}",
            idx + 1,
            step.step,
            step.visible.as_deref().unwrap_or("(nothing shown)")
        );
        for address in &step.jumps {
            println!("  jump: {address:#x}");
        }
        for warning in &step.warnings {
            println!("  warning: {warning}");
        }
        if let Some(note) = &step.note {
            println!("  note: {note}");
        }
    }
    if let Some(text) = &report.final_text {
        println!();
        println!("{text}");
    }

    Ok(())
}

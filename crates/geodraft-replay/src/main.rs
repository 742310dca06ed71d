//! Headless replay of editor input.
//!
//! Reads a JSON script from the file given as first argument (or stdin),
//! feeds its steps through a [`Canvas`] and prints the resulting scene.
//!
//! ```json
//! {
//!   "config": { "snap": { "tolerance": 12.0 } },
//!   "steps": [
//!     { "tool": "Rectangle" },
//!     { "pointer": { "kind": "down", "position": { "x": 0.0, "y": 0.0 } } },
//!     { "pointer": { "kind": "up", "position": { "x": 100.0, "y": 100.0 } } },
//!     { "key": { "Pressed": "Escape" } }
//!   ]
//! }
//! ```

use geodraft_core::{Canvas, ConfigError, EditorConfig, InputEvent, KeyEvent, PointerEvent, ToolKind};
use serde::Deserialize;
use std::io::Read;
use std::process::ExitCode;

#[derive(Debug, thiserror::Error)]
enum ReplayError {
    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid script: {0}")]
    Script(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
}

/// One scripted action.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Step {
    Tool(ToolKind),
    Pointer(PointerEvent),
    Key(KeyEvent),
}

#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default)]
    config: EditorConfig,
    steps: Vec<Step>,
}

fn read_script() -> Result<String, ReplayError> {
    let mut source = String::new();
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Reading script from {path}");
            source = std::fs::read_to_string(path)?;
        }
        None => {
            log::info!("Reading script from stdin");
            std::io::stdin().read_to_string(&mut source)?;
        }
    }
    Ok(source)
}

fn replay(source: &str) -> Result<Canvas, ReplayError> {
    let script: Script = serde_json::from_str(source)?;
    script.config.validate()?;

    let mut canvas = Canvas::with_config(script.config);
    for step in &script.steps {
        match step {
            Step::Tool(tool) => {
                log::debug!("Switching to {tool:?}");
                canvas.set_tool(*tool);
            }
            Step::Pointer(event) => canvas.handle_event(&InputEvent::Pointer(*event)),
            Step::Key(event) => canvas.handle_event(&InputEvent::Key(event.clone())),
        }
    }
    log::info!(
        "Replayed {} steps: {} shapes, {} points, {} lines",
        script.steps.len(),
        canvas.document.shapes.len(),
        canvas.document.points.len(),
        canvas.document.lines.len()
    );
    Ok(canvas)
}

fn run() -> Result<(), ReplayError> {
    let source = read_script()?;
    let canvas = replay(&source)?;
    println!("{}", canvas.document.to_json()?);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("geodraft-replay: {err}");
            ExitCode::FAILURE
        }
    }
}

//! Signal scripts for the simulated platform.
//!
//! A script is a comma-separated list of steps such as
//! `surface-created,resume,deny,grant,pause,resume`.

use std::str::FromStr;

use thiserror::Error;

/// Errors produced while parsing a script.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("unknown script step '{0}'")]
    UnknownStep(String),
}

/// One scripted signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStep {
    Resume,
    Pause,
    /// The user grants the permission in the prompt.
    Grant,
    /// The user denies the permission in the prompt.
    Deny,
    /// The user denies and ticks "don't ask again".
    DenyForever,
    /// The user presses the permission prompt's button.
    Press,
    SurfaceCreated,
    SurfaceChanged,
    SurfaceDestroyed,
    /// The open camera device disconnects.
    Disconnect,
}

impl FromStr for ScriptStep {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let step = match s.trim().to_ascii_lowercase().as_str() {
            "resume" => ScriptStep::Resume,
            "pause" => ScriptStep::Pause,
            "grant" => ScriptStep::Grant,
            "deny" => ScriptStep::Deny,
            "deny-forever" => ScriptStep::DenyForever,
            "press" => ScriptStep::Press,
            "surface-created" => ScriptStep::SurfaceCreated,
            "surface-changed" => ScriptStep::SurfaceChanged,
            "surface-destroyed" => ScriptStep::SurfaceDestroyed,
            "disconnect" => ScriptStep::Disconnect,
            other => return Err(ScriptError::UnknownStep(other.to_string())),
        };
        Ok(step)
    }
}

/// Parses a comma-separated script. Empty entries are skipped.
pub fn parse_script(text: &str) -> Result<Vec<ScriptStep>, ScriptError> {
    text.split(',')
        .filter(|step| !step.trim().is_empty())
        .map(str::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let steps = parse_script("surface-created, resume,Deny,grant,,pause").unwrap();
        assert_eq!(
            steps,
            vec![
                ScriptStep::SurfaceCreated,
                ScriptStep::Resume,
                ScriptStep::Deny,
                ScriptStep::Grant,
                ScriptStep::Pause,
            ]
        );
    }

    #[test]
    fn test_unknown_step_rejected() {
        assert_eq!(
            parse_script("resume,explode"),
            Err(ScriptError::UnknownStep("explode".to_string()))
        );
    }

    #[test]
    fn test_empty_script() {
        assert!(parse_script("").unwrap().is_empty());
    }
}

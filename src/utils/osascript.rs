use crate::error::{script_error, AppResult, Error};
use tokio::process::Command;
use tracing::debug;

/// Error number macOS reports when Automation access to an app was refused
const NOT_AUTHORIZED_CODE: &str = "-1743";

/// Script language understood by `osascript`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    AppleScript,
    JavaScript,
}

impl Language {
    fn as_arg(self) -> &'static str {
        match self {
            Language::AppleScript => "AppleScript",
            Language::JavaScript => "JavaScript",
        }
    }
}

/// Run a script through `osascript` and return its trimmed standard output
pub async fn run(language: Language, script: &str) -> AppResult<String> {
    debug!("Running {} script ({} bytes)", language.as_arg(), script.len());

    let output = Command::new("osascript")
        .arg("-l")
        .arg(language.as_arg())
        .arg("-e")
        .arg(script)
        .kill_on_drop(true)
        .output()
        .await?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        Err(classify_failure(&String::from_utf8_lossy(&output.stderr)))
    }
}

/// Map `osascript` stderr to an error, separating missing permissions from other failures
pub fn classify_failure(stderr: &str) -> Error {
    let message = stderr.trim();
    if message.contains(NOT_AUTHORIZED_CODE) {
        Error::NotAuthorized(message.to_string())
    } else if message.is_empty() {
        script_error("osascript exited with an error and no output")
    } else {
        script_error(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_failure_is_distinct() {
        let err = classify_failure(
            "execution error: Not authorised to send Apple events to Calendar. (-1743)\n",
        );
        assert!(matches!(err, Error::NotAuthorized(_)));
    }

    #[test]
    fn test_other_failures_are_script_errors() {
        let err = classify_failure("syntax error: Expected end of line. (-2741)");
        assert!(matches!(err, Error::Script(ref m) if m.contains("-2741")));

        let err = classify_failure("   ");
        assert!(matches!(err, Error::Script(_)));
    }
}

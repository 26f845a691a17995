// file: src/platform/command.rs
// version: 1.0.0
// guid: 2b7f9e04-c613-48da-a5b2-90e4d7c81f36

//! Command execution seam with a live and a scripted implementation

use crate::error::HardnError;
use crate::Result;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Mutex;
use tracing::debug;

/// Executes external programs with argv and optional stdin.
///
/// `execute` returns combined stdout+stderr on success; a non-zero
/// exit status surfaces as [`HardnError::CommandFailed`] carrying the
/// same combined output. `succeeds` is for boolean probes where a
/// failing exit is an answer, not an error.
#[async_trait::async_trait]
pub trait Commander: Send + Sync {
    async fn execute(&self, program: &str, args: &[&str]) -> Result<String>;

    async fn execute_with_input(&self, program: &str, args: &[&str], input: &str)
        -> Result<String>;

    async fn succeeds(&self, program: &str, args: &[&str]) -> bool {
        self.execute(program, args).await.is_ok()
    }
}

fn render_command(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

/// Live commander backed by tokio's process API
#[derive(Debug, Default, Clone)]
pub struct SystemCommander;

impl SystemCommander {
    pub fn new() -> Self {
        Self
    }

    fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
        let mut combined = String::from_utf8_lossy(stdout).to_string();
        let err = String::from_utf8_lossy(stderr);
        if !err.is_empty() {
            combined.push_str(&err);
        }
        combined
    }

    fn finish(
        program: &str,
        args: &[&str],
        output: std::process::Output,
    ) -> Result<String> {
        let combined = Self::combine_output(&output.stdout, &output.stderr);
        if output.status.success() {
            debug!("Command succeeded: {}", render_command(program, args));
            Ok(combined)
        } else {
            let code = output.status.code();
            debug!(
                "Command failed ({:?}): {}",
                code,
                render_command(program, args)
            );
            Err(HardnError::CommandFailed {
                program: program.to_string(),
                code,
                output: combined.trim_end().to_string(),
            })
        }
    }
}

#[async_trait::async_trait]
impl Commander for SystemCommander {
    async fn execute(&self, program: &str, args: &[&str]) -> Result<String> {
        debug!("Executing: {}", render_command(program, args));

        let output = tokio::process::Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|e| HardnError::CommandFailed {
                program: program.to_string(),
                code: None,
                output: format!("failed to spawn: {}", e),
            })?;

        Self::finish(program, args, output)
    }

    async fn execute_with_input(
        &self,
        program: &str,
        args: &[&str],
        input: &str,
    ) -> Result<String> {
        debug!("Executing with stdin: {}", render_command(program, args));

        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| HardnError::CommandFailed {
                program: program.to_string(),
                code: None,
                output: format!("failed to spawn: {}", e),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            tokio::io::AsyncWriteExt::write_all(&mut stdin, input.as_bytes()).await?;
        }

        let output = child.wait_with_output().await?;
        Self::finish(program, args, output)
    }
}

/// One invocation the mock saw, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Program plus argv joined by single spaces
    pub command: String,
    pub input: Option<String>,
}

#[derive(Debug, Clone)]
struct MockResponse {
    output: String,
    exit_code: i32,
}

#[derive(Debug, Default)]
struct MockState {
    /// Exact command line → response
    responses: HashMap<String, MockResponse>,
    /// Program name → response when no exact entry matches
    program_responses: HashMap<String, MockResponse>,
    calls: Vec<RecordedCall>,
}

/// Scripted commander double.
///
/// Responses are looked up by exact command line first, then by program
/// name; anything unscripted succeeds with empty output. Every call is
/// recorded in order, including piped stdin.
#[derive(Debug, Default)]
pub struct MockCommander {
    state: Mutex<MockState>,
}

impl MockCommander {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the output for one exact command line
    pub fn respond(&self, command: &str, output: &str) {
        let mut state = self.state.lock().unwrap();
        state.responses.insert(
            command.to_string(),
            MockResponse {
                output: output.to_string(),
                exit_code: 0,
            },
        );
    }

    /// Make one exact command line fail
    pub fn fail(&self, command: &str, exit_code: i32, output: &str) {
        let mut state = self.state.lock().unwrap();
        state.responses.insert(
            command.to_string(),
            MockResponse {
                output: output.to_string(),
                exit_code,
            },
        );
    }

    /// Script the output for every invocation of a program
    pub fn respond_program(&self, program: &str, output: &str) {
        let mut state = self.state.lock().unwrap();
        state.program_responses.insert(
            program.to_string(),
            MockResponse {
                output: output.to_string(),
                exit_code: 0,
            },
        );
    }

    /// Make every invocation of a program fail
    pub fn fail_program(&self, program: &str, exit_code: i32, output: &str) {
        let mut state = self.state.lock().unwrap();
        state.program_responses.insert(
            program.to_string(),
            MockResponse {
                output: output.to_string(),
                exit_code,
            },
        );
    }

    /// Command lines seen so far, in call order
    pub fn calls(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.calls.iter().map(|c| c.command.clone()).collect()
    }

    /// Full call records including stdin payloads
    pub fn recorded(&self) -> Vec<RecordedCall> {
        let state = self.state.lock().unwrap();
        state.calls.clone()
    }

    pub fn was_called(&self, command: &str) -> bool {
        let state = self.state.lock().unwrap();
        state.calls.iter().any(|c| c.command == command)
    }

    fn dispatch(&self, program: &str, args: &[&str], input: Option<&str>) -> Result<String> {
        let command = render_command(program, args);
        let mut state = self.state.lock().unwrap();
        state.calls.push(RecordedCall {
            command: command.clone(),
            input: input.map(|s| s.to_string()),
        });

        let response = state
            .responses
            .get(&command)
            .or_else(|| state.program_responses.get(program))
            .cloned()
            .unwrap_or(MockResponse {
                output: String::new(),
                exit_code: 0,
            });

        if response.exit_code == 0 {
            Ok(response.output)
        } else {
            Err(HardnError::CommandFailed {
                program: program.to_string(),
                code: Some(response.exit_code),
                output: response.output,
            })
        }
    }
}

#[async_trait::async_trait]
impl Commander for MockCommander {
    async fn execute(&self, program: &str, args: &[&str]) -> Result<String> {
        self.dispatch(program, args, None)
    }

    async fn execute_with_input(
        &self,
        program: &str,
        args: &[&str],
        input: &str,
    ) -> Result<String> {
        self.dispatch(program, args, Some(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_scripted_response() {
        let commander = MockCommander::new();
        commander.respond("id ops", "uid=1000(ops) gid=1000(ops)");

        let output = commander.execute("id", &["ops"]).await.unwrap();
        assert!(output.contains("uid=1000"));
        assert_eq!(commander.calls(), vec!["id ops"]);
    }

    #[tokio::test]
    async fn test_mock_failure_and_program_fallback() {
        let commander = MockCommander::new();
        commander.fail("id ops", 1, "no such user");
        commander.fail_program("ufw", 1, "ufw: command not found");

        let err = commander.execute("id", &["ops"]).await.unwrap_err();
        assert!(matches!(err, HardnError::CommandFailed { code: Some(1), .. }));

        // Any ufw invocation hits the program-level entry
        assert!(commander.execute("ufw", &["status", "verbose"]).await.is_err());
        assert!(!commander.succeeds("ufw", &["enable"]).await);

        // Unscripted commands succeed with empty output
        assert_eq!(commander.execute("uname", &["-r"]).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_mock_records_order_and_input() {
        let commander = MockCommander::new();
        commander
            .execute("ufw", &["default", "deny", "incoming"])
            .await
            .unwrap();
        commander
            .execute_with_input("ufw", &["enable"], "y\n")
            .await
            .unwrap();

        let recorded = commander.recorded();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].command, "ufw default deny incoming");
        assert_eq!(recorded[0].input, None);
        assert_eq!(recorded[1].command, "ufw enable");
        assert_eq!(recorded[1].input.as_deref(), Some("y\n"));
    }

    #[tokio::test]
    async fn test_system_commander_combines_output() {
        let commander = SystemCommander::new();
        let output = commander.execute("sh", &["-c", "echo out; echo err 1>&2"]).await.unwrap();
        assert!(output.contains("out"));
        assert!(output.contains("err"));
    }

    #[tokio::test]
    async fn test_system_commander_nonzero_exit() {
        let commander = SystemCommander::new();
        let err = commander.execute("sh", &["-c", "echo boom; exit 3"]).await.unwrap_err();
        match err {
            HardnError::CommandFailed { code, output, .. } => {
                assert_eq!(code, Some(3));
                assert!(output.contains("boom"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_system_commander_stdin() {
        let commander = SystemCommander::new();
        let output = commander
            .execute_with_input("cat", &[], "piped\n")
            .await
            .unwrap();
        assert_eq!(output, "piped\n");
    }
}

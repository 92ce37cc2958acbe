use crate::tool::ToolError;
use std::process::{Output, Stdio};

/// Abstraction over external CLI execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait CommandExecutor: Send + Sync {
    /// Execute a command and capture stdout.
    async fn exec(&self, program: &str, args: &[String]) -> Result<String, ToolError>;

    /// Execute a command, streaming output to the terminal.
    async fn exec_streaming(&self, program: &str, args: &[String]) -> Result<(), ToolError>;

    /// Execute a command with data piped to stdin.
    async fn exec_with_stdin(
        &self,
        program: &str,
        args: &[String],
        stdin_data: &[u8],
    ) -> Result<String, ToolError>;
}

/// Runs real processes, optionally with extra environment variables.
#[derive(Debug, Clone, Default)]
pub struct RealExecutor {
    envs: Vec<(String, String)>,
}

impl RealExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an environment variable to every spawned process.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    fn command(&self, program: &str, args: &[String]) -> tokio::process::Command {
        tracing::debug!(program, args = %args.join(" "), "exec");
        let mut cmd = tokio::process::Command::new(program);
        cmd.args(args);
        cmd.envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        cmd
    }
}

impl CommandExecutor for RealExecutor {
    async fn exec(&self, program: &str, args: &[String]) -> Result<String, ToolError> {
        let output = self
            .command(program, args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| not_found(program, e))?;

        captured(program, args, output)
    }

    async fn exec_streaming(&self, program: &str, args: &[String]) -> Result<(), ToolError> {
        let status = self
            .command(program, args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| not_found(program, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(ToolError::CommandFailed {
                program: program.to_owned(),
                args: args.to_vec(),
                code: status.code(),
                stdout: String::new(),
                stderr: String::new(),
            })
        }
    }

    async fn exec_with_stdin(
        &self,
        program: &str,
        args: &[String],
        stdin_data: &[u8],
    ) -> Result<String, ToolError> {
        use tokio::io::AsyncWriteExt;

        let mut child = self
            .command(program, args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| not_found(program, e))?;

        if let Some(mut stdin) = child.stdin.take() {
            let stdin_error = |e| ToolError::StdinWrite {
                program: program.to_owned(),
                source: e,
            };
            stdin.write_all(stdin_data).await.map_err(stdin_error)?;
            stdin.shutdown().await.map_err(stdin_error)?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| not_found(program, e))?;

        captured(program, args, output)
    }
}

fn not_found(program: &str, source: std::io::Error) -> ToolError {
    ToolError::NotFound {
        program: program.to_owned(),
        source,
    }
}

fn captured(program: &str, args: &[String], output: Output) -> Result<String, ToolError> {
    if output.status.success() {
        String::from_utf8(output.stdout).map_err(|e| ToolError::InvalidUtf8 {
            program: program.to_owned(),
            source: e,
        })
    } else {
        Err(ToolError::CommandFailed {
            program: program.to_owned(),
            args: args.to_vec(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

pub(crate) fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}

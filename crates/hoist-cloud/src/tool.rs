/// Failure of an external command-line tool.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("{program} not found; is it installed and on PATH?")]
    NotFound {
        program: String,
        source: std::io::Error,
    },

    #[error(
        "command failed ({}): {program} {}\n{}",
        describe_exit(*code),
        args.join(" "),
        captured_output(stdout, stderr)
    )]
    CommandFailed {
        program: String,
        args: Vec<String>,
        /// Exit code, `None` when the process was killed by a signal.
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("{program} output was not valid UTF-8")]
    InvalidUtf8 {
        program: String,
        source: std::string::FromUtf8Error,
    },

    #[error("failed to write to {program} stdin")]
    StdinWrite {
        program: String,
        source: std::io::Error,
    },
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {c}"),
        None => "terminated by signal".to_owned(),
    }
}

fn captured_output(stdout: &str, stderr: &str) -> String {
    match (stdout.trim(), stderr.trim()) {
        ("", "") => "(no output captured)".to_owned(),
        (out, "") => out.to_owned(),
        ("", err) => err.to_owned(),
        (out, err) => format!("{out}\n{err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(stdout: &str, stderr: &str) -> ToolError {
        ToolError::CommandFailed {
            program: "docker".to_owned(),
            args: vec!["push".to_owned(), "repo:tag".to_owned()],
            code: Some(1),
            stdout: stdout.to_owned(),
            stderr: stderr.to_owned(),
        }
    }

    #[test]
    fn display_includes_command_and_stderr() {
        let msg = failed("", "denied: not authorized\n").to_string();
        assert!(msg.contains("docker push repo:tag"));
        assert!(msg.contains("exit code 1"));
        assert!(msg.contains("denied: not authorized"));
    }

    #[test]
    fn display_includes_both_streams() {
        let msg = failed("step 1/4", "boom").to_string();
        assert!(msg.contains("step 1/4\nboom"));
    }

    #[test]
    fn display_marks_empty_output() {
        assert!(failed("", "").to_string().contains("(no output captured)"));
    }
}

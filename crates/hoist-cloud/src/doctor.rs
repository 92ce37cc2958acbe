use crate::executor::{CommandExecutor, RealExecutor, args};
use crate::tool::ToolError;
use std::fmt;

/// Read-only environment checks. Every check runs, none returns early.
pub struct Doctor<E: CommandExecutor = RealExecutor> {
    executor: E,
}

impl Doctor<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor::new(),
        }
    }
}

impl Default for Doctor<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CommandExecutor> Doctor<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    pub async fn run(&self, profile: &str) -> DoctorReport {
        let mut report = DoctorReport::default();

        // 1. aws CLI: "aws-cli/2.15.0 Python/3.11.6 ..."
        report.aws = self
            .tool_version("aws", &args(["--version"]), |out| {
                first_word(out).to_owned()
            })
            .await;

        // 2. docker daemon reachable (client-only installs fail here)
        report.docker = self
            .tool_version(
                "docker",
                &args(["version", "--format", "{{.Server.Version}}"]),
                |out| out.trim().to_owned(),
            )
            .await;

        // 3. terraform: "Terraform v1.7.5\non linux_amd64"
        report.terraform = self
            .tool_version("terraform", &args(["version"]), |out| {
                head_line(out).trim().to_owned()
            })
            .await;

        // 4. git: "git version 2.43.0"
        report.git = self
            .tool_version("git", &args(["--version"]), |out| {
                out.trim().trim_start_matches("git version ").to_owned()
            })
            .await;

        // 5. credentials
        report.account = match self
            .executor
            .exec(
                "aws",
                &args([
                    "sts",
                    "get-caller-identity",
                    "--query",
                    "Account",
                    "--output",
                    "text",
                    "--profile",
                    profile,
                ]),
            )
            .await
        {
            Ok(a) if !a.trim().is_empty() => {
                CheckResult::ok(&format!("{} (profile {profile})", a.trim()))
            }
            Ok(_) => CheckResult::fail(&format!("no account for profile {profile}")),
            Err(e) => CheckResult::fail(&first_line(&e)),
        };

        report
    }

    async fn tool_version(
        &self,
        program: &str,
        cmd: &[String],
        parse: impl Fn(&str) -> String,
    ) -> CheckResult {
        match self.executor.exec(program, cmd).await {
            Ok(out) => CheckResult::ok(&parse(&out)),
            Err(e) => CheckResult::fail(&first_line(&e)),
        }
    }
}

fn first_line(err: &ToolError) -> String {
    head_line(&err.to_string()).to_owned()
}

fn head_line(text: &str) -> &str {
    match text.lines().next() {
        Some(line) => line,
        None => "",
    }
}

fn first_word(text: &str) -> &str {
    match text.split_whitespace().next() {
        Some(word) => word,
        None => text,
    }
}

// ── Report types ──

#[derive(Debug, Default)]
pub struct DoctorReport {
    pub aws: CheckResult,
    pub docker: CheckResult,
    pub terraform: CheckResult,
    pub git: CheckResult,
    pub account: CheckResult,
    pub infra_dir: CheckResult,
    pub config_file: CheckResult,
}

impl DoctorReport {
    pub fn all_passed(&self) -> bool {
        self.rows().iter().all(|(_, r)| r.passed)
    }

    fn rows(&self) -> [(&'static str, &CheckResult); 7] {
        [
            ("aws CLI", &self.aws),
            ("docker", &self.docker),
            ("terraform", &self.terraform),
            ("git", &self.git),
            ("AWS account", &self.account),
            ("infra dir", &self.infra_dir),
            ("hoist.toml", &self.config_file),
        ]
    }
}

impl fmt::Display for DoctorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "hoist doctor")?;
        writeln!(f, "{}", "-".repeat(40))?;
        for (label, result) in self.rows() {
            writeln!(f, "{label:<13} {}  {}", result.icon(), result.detail)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct CheckResult {
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    pub fn ok(detail: &str) -> Self {
        Self {
            passed: true,
            detail: detail.to_owned(),
        }
    }

    pub fn fail(detail: &str) -> Self {
        Self {
            passed: false,
            detail: detail.to_owned(),
        }
    }

    pub fn icon(&self) -> &'static str {
        if self.passed { "OK" } else { "NG" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passing() -> DoctorReport {
        DoctorReport {
            aws: CheckResult::ok("aws-cli/2.15.0"),
            docker: CheckResult::ok("25.0.3"),
            terraform: CheckResult::ok("Terraform v1.7.5"),
            git: CheckResult::ok("2.43.0"),
            account: CheckResult::ok("123456789012"),
            infra_dir: CheckResult::ok("infra"),
            config_file: CheckResult::ok("Found"),
        }
    }

    #[test]
    fn all_passed_requires_every_row() {
        assert!(passing().all_passed());

        let report = DoctorReport {
            config_file: CheckResult::fail("Not found"),
            ..passing()
        };
        assert!(!report.all_passed());
    }

    #[test]
    fn version_text_helpers() {
        assert_eq!(first_word("aws-cli/2.15.0 Python/3.11.6"), "aws-cli/2.15.0");
        assert_eq!(first_word(""), "");
        assert_eq!(head_line("Terraform v1.7.5\non linux_amd64"), "Terraform v1.7.5");
        assert_eq!(head_line(""), "");
    }

    #[test]
    fn default_report_fails() {
        assert!(!DoctorReport::default().all_passed());
    }

    #[test]
    fn display_lists_every_check() {
        let text = passing().to_string();
        for label in ["aws CLI", "docker", "terraform", "git", "AWS account", "infra dir", "hoist.toml"] {
            assert!(text.contains(label), "missing {label}");
        }
        assert!(text.contains("OK  25.0.3"));
    }
}

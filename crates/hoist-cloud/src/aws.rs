use crate::executor::{CommandExecutor, RealExecutor, args};
use crate::tool::ToolError;
use secrecy::SecretString;

/// Registry domain for ECR in `region`, without the account prefix.
pub fn registry_domain(region: &str) -> String {
    format!("dkr.ecr.{region}.amazonaws.com")
}

/// Fully-qualified registry host: `{account_id}.dkr.ecr.{region}.amazonaws.com`.
pub fn registry_host(account_id: &str, region: &str) -> String {
    format!("{account_id}.{}", registry_domain(region))
}

/// AWS identity and ECR operations through the aws CLI.
pub struct AwsClient<E: CommandExecutor = RealExecutor> {
    executor: E,
}

impl AwsClient<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor::new(),
        }
    }
}

impl Default for AwsClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CommandExecutor> AwsClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    // ── Identity ──

    /// Account id of the active credentials.
    pub async fn current_account_id(&self, profile: &str) -> Result<String, AuthError> {
        let output = self
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
            .map_err(|e| AuthError::Identity {
                profile: profile.to_owned(),
                source: e,
            })?;

        let account_id = output.trim();
        if account_id.is_empty() || account_id == "None" {
            return Err(AuthError::EmptyAccountId {
                profile: profile.to_owned(),
            });
        }
        Ok(account_id.to_owned())
    }

    /// Short-lived password for `docker login` against ECR.
    pub async fn registry_login_token(
        &self,
        region: &str,
        profile: &str,
    ) -> Result<SecretString, AuthError> {
        let output = self
            .executor
            .exec(
                "aws",
                &args([
                    "ecr",
                    "get-login-password",
                    "--region",
                    region,
                    "--profile",
                    profile,
                ]),
            )
            .await
            .map_err(|e| AuthError::LoginToken {
                region: region.to_owned(),
                source: e,
            })?;

        let token = output.trim();
        if token.is_empty() {
            return Err(AuthError::EmptyToken {
                region: region.to_owned(),
            });
        }
        Ok(SecretString::from(token.to_owned()))
    }

    // ── ECR repositories ──

    /// Whether repository `name` exists. Any probe failure counts as "absent".
    pub async fn repository_exists(&self, name: &str, region: &str, profile: &str) -> bool {
        match self
            .executor
            .exec(
                "aws",
                &args([
                    "ecr",
                    "describe-repositories",
                    "--repository-names",
                    name,
                    "--region",
                    region,
                    "--profile",
                    profile,
                ]),
            )
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(repository = name, error = %e, "repository probe failed");
                false
            }
        }
    }

    pub async fn create_repository(
        &self,
        name: &str,
        region: &str,
        profile: &str,
    ) -> Result<(), ToolError> {
        self.executor
            .exec(
                "aws",
                &args([
                    "ecr",
                    "create-repository",
                    "--repository-name",
                    name,
                    "--region",
                    region,
                    "--profile",
                    profile,
                ]),
            )
            .await?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("could not resolve AWS identity for profile '{profile}'; run: aws configure --profile {profile}")]
    Identity { profile: String, source: ToolError },

    #[error("AWS returned no account id for profile '{profile}'")]
    EmptyAccountId { profile: String },

    #[error("could not obtain an ECR login token in {region}")]
    LoginToken { region: String, source: ToolError },

    #[error("AWS returned an empty ECR login token in {region}")]
    EmptyToken { region: String },
}

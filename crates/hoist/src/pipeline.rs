use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use hoist_build::{SynthOutcome, SynthReport};
use hoist_cloud::{
    CommandExecutor, GitClient, PublishRequest, RealExecutor, RegistryPublisher, TerraformClient,
};
use hoist_core::{DetectionResult, Ecosystem, HoistConfig, ReleaseDescriptor, Workspace};
use serde::Serialize;

use crate::Result;
use crate::record::{BuildRecord, default_image_tag};

/// Environment entry added for Python services unless the caller set it.
pub const GUNICORN_ENV: &str = "GUNICORN_CMD_ARGS";
pub const GUNICORN_DEFAULT_ARGS: &str = "--access-logfile - --log-level info";

/// Parameters of one deploy run, after flags and `hoist.toml` are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    /// Clone this repository into a freshly reset workspace. `None` reuses
    /// whatever is already in the workspace source directory.
    pub repo_url: Option<String>,
    pub app_name: String,
    pub region: String,
    pub profile: String,
    /// Defaults to a UTC timestamp when `None`.
    pub image_tag: Option<String>,
    pub extra_env: BTreeMap<String, String>,
}

impl DeployRequest {
    pub fn from_config(config: &HoistConfig) -> Self {
        Self {
            repo_url: None,
            app_name: config.project.name.clone(),
            region: config.project.region.clone(),
            profile: config.project.profile.clone(),
            image_tag: None,
            extra_env: config.deploy.env.clone(),
        }
    }
}

/// Values read back from provisioning outputs. Either may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeploymentSummary {
    pub service_name: Option<String>,
    pub public_endpoint: Option<String>,
}

impl fmt::Display for DeploymentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Service  : {}", or_missing(&self.service_name))?;
        write!(f, "Endpoint : {}", or_missing(&self.public_endpoint))
    }
}

fn or_missing(value: &Option<String>) -> &str {
    match value {
        Some(v) => v,
        None => "(not reported)",
    }
}

/// Everything a successful deploy produced.
#[derive(Debug, Serialize)]
pub struct DeployReport {
    pub detection: DetectionResult,
    #[serde(skip)]
    pub runtime_files: Vec<SynthReport>,
    #[serde(skip)]
    pub dockerfile: SynthOutcome,
    pub record: BuildRecord,
    pub record_path: PathBuf,
    pub descriptor_path: PathBuf,
    pub summary: DeploymentSummary,
}

/// Sequences workspace, inspection, synthesis, publish, descriptor and
/// provisioning. Any failure aborts everything after it.
pub struct Pipeline<E: CommandExecutor = RealExecutor> {
    git: GitClient<E>,
    publisher: RegistryPublisher<E>,
    terraform: TerraformClient<E>,
}

impl Pipeline<RealExecutor> {
    pub fn new(config: &HoistConfig, profile: &str, region: &str) -> Self {
        Self {
            git: GitClient::new(),
            publisher: RegistryPublisher::new(),
            terraform: TerraformClient::new(config.deploy.infra_dir.clone(), profile, region),
        }
    }
}

impl<E: CommandExecutor> Pipeline<E> {
    pub fn with_parts(
        git: GitClient<E>,
        publisher: RegistryPublisher<E>,
        terraform: TerraformClient<E>,
    ) -> Self {
        Self {
            git,
            publisher,
            terraform,
        }
    }

    pub async fn deploy(
        &self,
        workspace: &Workspace,
        config: &HoistConfig,
        req: &DeployRequest,
    ) -> Result<DeployReport> {
        self.prepare_source(workspace, req.repo_url.as_deref())
            .await?;
        let source = workspace.source_dir();

        // Build stage
        let ecosystem = hoist_build::detect_ecosystem(source);
        let runtime_files = hoist_build::ensure_runtime_files(ecosystem, source)?;
        let listen_port = hoist_build::detect_port(source, config.build.default_port);
        let detection = DetectionResult {
            ecosystem,
            listen_port,
        };
        tracing::info!(ecosystem = %ecosystem, port = listen_port, "source inspected");
        let dockerfile =
            hoist_build::ensure_dockerfile(&config.build, ecosystem, listen_port, source)?;

        // Publish
        let image_tag = match &req.image_tag {
            Some(tag) => tag.clone(),
            None => default_image_tag(),
        };
        let published = self
            .publisher
            .publish(&PublishRequest {
                region: &req.region,
                profile: &req.profile,
                app_name: &req.app_name,
                image_tag: &image_tag,
                context_dir: source,
            })
            .await?;

        let record = BuildRecord::new(&req.app_name, &image_tag, detection, &published);
        let record_path = record.write(workspace.build_dir())?;

        // Release
        let descriptor = ReleaseDescriptor {
            app_name: req.app_name.clone(),
            image_uri: published.remote_uri,
            region: req.region.clone(),
            container_port: listen_port,
            desired_count: config.deploy.desired_count,
            extra_env: container_env(ecosystem, &req.extra_env),
        };
        let descriptor_path = descriptor.write(&config.descriptor_path())?;
        tracing::info!(path = %descriptor_path.display(), "release descriptor written");

        self.terraform.init().await?;
        self.terraform.apply(&descriptor_path).await?;
        let summary = self.read_summary(config).await?;

        Ok(DeployReport {
            detection,
            runtime_files,
            dockerfile,
            record,
            record_path,
            descriptor_path,
            summary,
        })
    }

    /// Tear down what the last deploy provisioned.
    pub async fn destroy(&self, config: &HoistConfig) -> Result<()> {
        let vars = config.descriptor_path();
        let vars = vars.is_file().then_some(vars.as_path());
        if vars.is_none() {
            tracing::warn!("no release descriptor found, destroying without variables");
        }

        self.terraform.init().await?;
        self.terraform.destroy(vars).await?;
        Ok(())
    }

    async fn prepare_source(&self, workspace: &Workspace, repo_url: Option<&str>) -> Result<()> {
        match repo_url {
            Some(url) => {
                workspace.reset()?;
                self.git.clone_repo(url, workspace.source_dir()).await?;
            }
            None => {
                workspace.prepare()?;
                tracing::info!(
                    source = %workspace.source_dir().display(),
                    "using existing workspace source"
                );
            }
        }
        Ok(())
    }

    async fn read_summary(&self, config: &HoistConfig) -> Result<DeploymentSummary> {
        let service_name = self.terraform.output(&config.deploy.service_output).await?;
        let public_endpoint = self
            .terraform
            .output(&config.deploy.endpoint_output)
            .await?
            .map(|dns| endpoint_url(&dns));
        Ok(DeploymentSummary {
            service_name,
            public_endpoint,
        })
    }

    pub fn infra_dir(&self) -> &Path {
        self.terraform.infra_dir()
    }
}

/// Extra container environment for `ecosystem`. Caller-supplied entries win.
pub fn container_env(
    ecosystem: Ecosystem,
    requested: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut env = requested.clone();
    if ecosystem == Ecosystem::Python {
        env.entry(GUNICORN_ENV.to_owned())
            .or_insert_with(|| GUNICORN_DEFAULT_ARGS.to_owned());
    }
    env
}

fn endpoint_url(dns: &str) -> String {
    if dns.starts_with("http://") || dns.starts_with("https://") {
        dns.to_owned()
    } else {
        format!("http://{dns}")
    }
}

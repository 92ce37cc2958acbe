use hoist::build::SynthOutcome;
use hoist::{DeployReport, DeployRequest, HoistConfig, Pipeline, Workspace};
use std::path::Path;

#[derive(clap::Args)]
pub struct DeployArgs {
    /// Repository to clone into a fresh workspace. Without it the existing
    /// workspace source is deployed.
    #[arg(long)]
    repo: Option<String>,
    /// Application name, also the ECR repository name (overrides hoist.toml)
    #[arg(long)]
    app_name: Option<String>,
    /// AWS region (overrides hoist.toml)
    #[arg(long)]
    region: Option<String>,
    /// AWS credentials profile (overrides hoist.toml)
    #[arg(long)]
    profile: Option<String>,
    /// Image tag (default: UTC timestamp)
    #[arg(long)]
    image_tag: Option<String>,
    /// Extra container environment variable, repeatable
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env)]
    env: Vec<(String, String)>,
    /// Print the deploy report as JSON
    #[arg(long)]
    json: bool,
}

/// Run the full deploy pipeline.
pub async fn deploy(args: DeployArgs) -> anyhow::Result<()> {
    let config = HoistConfig::load(Path::new("."))?;
    let json = args.json;
    let request = build_request(&config, args);

    if request.app_name.trim().is_empty() {
        anyhow::bail!("app name is empty; set [project].name in hoist.toml or pass --app-name");
    }

    tracing::debug!(
        app = %request.app_name,
        region = %request.region,
        repo = ?request.repo_url,
        "resolved deploy request"
    );

    let workspace = Workspace::new(config.workspace.root.clone());
    let pipeline = Pipeline::new(&config, &request.profile, &request.region);

    if !json {
        println!(
            "Deploying '{}' to {} (profile {})...",
            request.app_name, request.region, request.profile
        );
    }

    let report = pipeline.deploy(&workspace, &config, &request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Merge flags over hoist.toml. `--env` entries are applied in order, so a
/// later duplicate key wins.
fn build_request(config: &HoistConfig, args: DeployArgs) -> DeployRequest {
    let mut request = DeployRequest::from_config(config);
    request.repo_url = args.repo;
    request.image_tag = args.image_tag;
    if let Some(name) = args.app_name {
        request.app_name = name;
    }
    if let Some(region) = args.region {
        request.region = region;
    }
    if let Some(profile) = args.profile {
        request.profile = profile;
    }
    request.extra_env.extend(args.env);
    request
}

fn print_report(report: &DeployReport) {
    println!(
        "Detected {} (port {})",
        report.detection.ecosystem, report.detection.listen_port
    );
    for file in &report.runtime_files {
        if file.outcome == SynthOutcome::Written {
            println!("  Generated {}", file.path);
        }
    }
    match report.dockerfile {
        SynthOutcome::Written => println!("  Generated Dockerfile"),
        SynthOutcome::Kept => println!("  Using existing Dockerfile"),
    }
    println!("Pushed {}", report.record.remote_uri);
    println!("Wrote {}", report.descriptor_path.display());
    println!();
    println!("{}", report.summary);
}

fn parse_env(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_owned(), value.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> DeployArgs {
        DeployArgs {
            repo: None,
            app_name: None,
            region: None,
            profile: None,
            image_tag: None,
            env: vec![],
            json: false,
        }
    }

    #[test]
    fn parse_env_splits_on_first_equals() {
        assert_eq!(
            parse_env("DATABASE_URL=postgres://u:p@h/db?sslmode=require"),
            Ok((
                "DATABASE_URL".to_owned(),
                "postgres://u:p@h/db?sslmode=require".to_owned()
            ))
        );
        assert_eq!(parse_env("EMPTY="), Ok(("EMPTY".to_owned(), String::new())));
    }

    #[test]
    fn parse_env_rejects_malformed() {
        assert!(parse_env("NOVALUE").is_err());
        assert!(parse_env("=value").is_err());
    }

    #[test]
    fn flags_override_config() {
        let mut config = HoistConfig::default();
        config.project.region = "eu-west-1".to_owned();
        config.deploy.env.insert("A".to_owned(), "from-config".to_owned());
        config.deploy.env.insert("B".to_owned(), "kept".to_owned());

        let request = build_request(
            &config,
            DeployArgs {
                app_name: Some("api".to_owned()),
                profile: Some("ops".to_owned()),
                env: vec![
                    ("A".to_owned(), "first".to_owned()),
                    ("A".to_owned(), "second".to_owned()),
                ],
                ..args()
            },
        );

        assert_eq!(request.app_name, "api");
        assert_eq!(request.region, "eu-west-1");
        assert_eq!(request.profile, "ops");
        assert_eq!(request.extra_env["A"], "second");
        assert_eq!(request.extra_env["B"], "kept");
    }

    #[test]
    fn no_flags_means_config_values() {
        let config = HoistConfig::default();
        let request = build_request(&config, args());
        assert_eq!(request, DeployRequest::from_config(&config));
    }
}

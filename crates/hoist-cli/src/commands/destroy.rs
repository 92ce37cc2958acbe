use hoist::{HoistConfig, Pipeline};
use std::io::Write;
use std::path::Path;

/// Tear down everything Terraform manages in the infra directory.
pub async fn destroy(
    region: Option<String>,
    profile: Option<String>,
    skip_confirm: bool,
) -> anyhow::Result<()> {
    let config = HoistConfig::load(Path::new("."))?;
    let region = match region {
        Some(r) => r,
        None => config.project.region.clone(),
    };
    let profile = match profile {
        Some(p) => p,
        None => config.project.profile.clone(),
    };
    let infra_dir = &config.deploy.infra_dir;

    if !infra_dir.is_dir() {
        anyhow::bail!("infra directory {} not found", infra_dir.display());
    }

    if !skip_confirm {
        println!("This will destroy:");
        println!(
            "  - all resources managed by {} in {region} (profile {profile})",
            infra_dir.display()
        );
        println!();
        print!("Are you sure? [y/N] ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !matches!(input.trim(), "y" | "Y" | "yes" | "YES") {
            println!("Aborted.");
            return Ok(());
        }
    }

    Pipeline::new(&config, &profile, &region)
        .destroy(&config)
        .await?;

    println!();
    println!("Destroyed.");
    Ok(())
}

use hoist::HoistConfig;
use hoist::cloud::{CheckResult, Doctor};
use hoist::config::CONFIG_FILE;
use std::path::Path;

pub async fn doctor() -> anyhow::Result<()> {
    // A broken hoist.toml is a failed check, not an abort.
    let (config_check, config) = match HoistConfig::load(Path::new(".")) {
        Ok(config) if Path::new(CONFIG_FILE).exists() => (CheckResult::ok("Found"), config),
        Ok(config) => (CheckResult::fail("Not found"), config),
        Err(e) => (CheckResult::fail(&e.to_string()), HoistConfig::default()),
    };

    let mut report = Doctor::new().run(&config.project.profile).await;

    let infra_dir = &config.deploy.infra_dir;
    report.infra_dir = if infra_dir.is_dir() {
        CheckResult::ok(&infra_dir.display().to_string())
    } else {
        CheckResult::fail(&format!("{} not found", infra_dir.display()))
    };
    report.config_file = config_check;

    println!();
    println!("{report}");

    if !report.all_passed() {
        anyhow::bail!("some checks failed; see above for details");
    }

    Ok(())
}

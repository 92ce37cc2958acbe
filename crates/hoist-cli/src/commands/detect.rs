use hoist::HoistConfig;
use std::path::Path;

/// Run the source inspector alone and print what it found.
pub fn detect(path: &Path, default_port: Option<u16>, json: bool) -> anyhow::Result<()> {
    if !path.is_dir() {
        anyhow::bail!("{} is not a directory", path.display());
    }

    let default_port = match default_port {
        Some(port) => port,
        None => HoistConfig::load(Path::new("."))?.build.default_port,
    };
    let result = hoist::build::inspect(path, default_port);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Ecosystem : {}", result.ecosystem);
        println!("Port      : {}", result.listen_port);
    }
    Ok(())
}

use std::env;
use std::fs;
use std::path::Path;

const PROFILES: [&str; 2] = ["debug", "release"];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Copy config files next to the built binaries so AppConfig::load finds
    // them regardless of the working directory
    let out_dir = env::var("OUT_DIR")?;
    let profile = env::var("PROFILE")?;

    // OUT_DIR is like: target/debug/build/touch-dispatch-xxx/out
    // We want: target/debug/config
    let target_dir = Path::new(&out_dir)
        .parent()
        .and_then(|p| p.parent())
        .and_then(|p| p.parent())
        .ok_or("Could not determine target directory")?;

    let config_out_dir = target_dir.join("config");
    fs::create_dir_all(&config_out_dir)?;

    // Release builds only ship the release profile
    let wanted: &[&str] = if profile == "release" {
        &PROFILES[1..]
    } else {
        &PROFILES
    };

    for name in wanted {
        let file_name = format!("{name}.toml");
        let source = Path::new("config").join(&file_name);
        println!("cargo:rerun-if-changed={}", source.display());
        if source.exists() {
            fs::copy(&source, config_out_dir.join(&file_name))?;
        }
    }

    Ok(())
}

use crate::config::generate::generate_starter_config;
use crate::config::config_search_paths;
use std::fs;
use std::path::PathBuf;

pub fn init(stdout: bool, path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config_content = generate_starter_config();

    if stdout {
        print!("{}", config_content);
        return Ok(());
    }

    let config_path = path
        .or_else(|| config_search_paths().into_iter().next())
        .ok_or("No config location available. Use --config to specify a path.")?;

    if config_path.exists() {
        return Err(format!(
            "Config file already exists at {}. Remove it first or use --stdout to print the config",
            config_path.display()
        )
        .into());
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Cannot create directory {}: {}", parent.display(), e))?;
    }

    fs::write(&config_path, config_content)?;

    println!("Config file written to {}", config_path.display());
    Ok(())
}

pub fn validate(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path.ok_or("No config file found. Use --config to specify a path.")?;

    println!("Validating config file: {}", path.display());

    match crate::config::load_config(&path) {
        Ok(_) => {
            println!("✓ Config is valid");
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Config validation failed:\n{}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yml");

        init(false, Some(path.clone())).unwrap();

        assert!(crate::config::load_config(&path).is_ok());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(&path, "existing").unwrap();

        assert!(init(false, Some(path.clone())).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "existing");
    }
}

use std::{
    fs::{self, create_dir_all},
    path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;
use xdg::BaseDirectories;

use crate::{Error, Result};

/// Returns the path to the Kenavo configuration directory. If it doesn't exist when this
/// function is called, it will be created.
pub fn config_dir() -> Result<PathBuf> {
    let path = xdg_prefix().get_config_home().ok_or(Error::NoConfigHome)?;

    create_dir_all(&path)?;

    Ok(path)
}

/// Read a JSON document from disk, such as an exported profile snapshot.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn xdg_prefix() -> BaseDirectories {
    xdg::BaseDirectories::with_prefix("kenavo")
}

#[cfg(test)]
mod test {
    use std::fs;

    use super::read_json;
    use crate::directory::Profile;

    #[test]
    fn test_read_json_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.json");
        fs::write(&path, r#"[{"id": 1, "name": "Alice Smith"}]"#).unwrap();

        let profiles: Vec<Profile> = read_json(&path).unwrap();

        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles.first().unwrap().name, "Alice Smith");
    }

    #[test]
    fn test_read_json_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result: crate::Result<Vec<Profile>> = read_json(&dir.path().join("nope.json"));

        assert!(matches!(result, Err(crate::Error::Io(_))));
    }
}

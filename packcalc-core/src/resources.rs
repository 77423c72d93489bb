#![cfg(feature = "resources")]

use include_dir::{include_dir, Dir};
pub const RESOURCES_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/resources");

/// List the packaged files under `subdir` of the resources directory, sorted
/// by name.  An unknown `subdir` lists the top level; pass `""` for the top level.
pub fn list_resources(subdir: &str) -> Vec<String> {
    let dir = RESOURCES_DIR.get_dir(subdir).unwrap_or(&RESOURCES_DIR);
    let mut file_names: Vec<String> = dir
        .files()
        .filter_map(|entry| entry.path().file_name()?.to_str().map(String::from))
        .collect();
    file_names.sort();
    file_names
}

/// Contents of a packaged text resource, e.g. `"cycles/ece15.txt"`
pub fn resource_str(filepath: &str) -> anyhow::Result<&'static str> {
    RESOURCES_DIR
        .get_file(filepath)
        .and_then(|f| f.contents_utf8())
        .ok_or_else(|| anyhow::anyhow!("No UTF-8 resource at {filepath:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_resources() {
        assert_eq!(list_resources("cycles"), vec!["ece15.txt".to_string()]);
        assert_eq!(list_resources("params"), vec!["default.yaml".to_string()]);
    }

    #[test]
    fn test_missing_resource() {
        assert!(resource_str("cycles/nope.txt").is_err());
        assert!(resource_str("cycles/ece15.txt").is_ok());
    }
}

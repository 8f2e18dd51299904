use std::fs;
use std::path::Path;

use scrag_core::error::AppError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Write pretty JSON through a sibling `.tmp` file and rename it into place.
pub(crate) fn write_json_atomic<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    code: &str,
    what: &str,
) -> Result<(), AppError> {
    let tmp = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(value).map_err(|e| {
        AppError::new(code, format!("Failed to encode {what}")).with_details(e.to_string())
    })?;
    fs::write(&tmp, json.as_bytes()).map_err(|e| {
        AppError::at_path(code, format!("Failed to write {what}"), &tmp, &e)
    })?;
    fs::rename(&tmp, path).map_err(|e| {
        AppError::new(code, format!("Failed to finalize {what} write")).with_details(format!(
            "tmp={}; dest={}; err={}",
            tmp.display(),
            path.display(),
            e
        ))
    })
}

/// Read JSON from `path`, or `T::default()` when the file does not exist yet.
pub(crate) fn read_json_or_default<T: DeserializeOwned + Default>(
    path: &Path,
    code: &str,
    what: &str,
) -> Result<T, AppError> {
    if !path.exists() {
        return Ok(T::default());
    }
    let bytes = fs::read(path).map_err(|e| {
        AppError::at_path(code, format!("Failed to read {what}"), path, &e)
    })?;
    serde_json::from_slice(&bytes).map_err(|e| {
        AppError::at_path(code, format!("Failed to decode {what}"), path, &e)
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_reads_as_default_and_writes_leave_no_tmp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.json");

        let empty: BTreeMap<String, u32> = read_json_or_default(&path, "T", "map").unwrap();
        assert!(empty.is_empty());

        let mut m = BTreeMap::new();
        m.insert("a".to_string(), 1u32);
        write_json_atomic(&path, &m, "T", "map").unwrap();
        assert!(!path.with_extension("tmp").exists());

        let back: BTreeMap<String, u32> = read_json_or_default(&path, "T", "map").unwrap();
        assert_eq!(back, m);
    }
}

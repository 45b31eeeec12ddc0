use anyhow::anyhow;
use serde::de::DeserializeOwned;

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> anyhow::Result<T> {
    let de = &mut serde_json::Deserializer::from_str(src);
    match serde_path_to_error::deserialize::<_, T>(de) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(anyhow!("at JSON path {path} → {}", err.into_inner()))
        }
    }
}

/// Read and parse a JSON document from disk, path-annotated on both failures.
pub fn load_document(path: &std::path::Path) -> anyhow::Result<serde_json::Value> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read {}: {e}", path.display()))?;
    from_str_with_path(&source).map_err(|e| anyhow!("{}: {e}", path.display()))
}

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_yaml::Value;
use std::path::{Path, PathBuf};

/// Template related errors
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("unable to read the template file at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse the template file at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to decode the {kind} document: {source}")]
    Decode {
        kind: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("no Workload document found in {}; the template must declare exactly one", .path.display())]
    WorkloadMissing { path: PathBuf },
}

impl TemplateError {
    fn read(path: &Path, source: std::io::Error) -> Self {
        TemplateError::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    fn parse(path: &Path, source: serde_yaml::Error) -> Self {
        TemplateError::Parse {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Load every document of a multi-document YAML file, in file order.
/// Empty documents are dropped; kind filtering is left to the caller.
pub fn load(path: &Path) -> Result<Vec<Value>, TemplateError> {
    let content = std::fs::read_to_string(path).map_err(|source| TemplateError::read(path, source))?;

    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(&content) {
        let value = Value::deserialize(document).map_err(|source| TemplateError::parse(path, source))?;
        if !value.is_null() {
            documents.push(value);
        }
    }
    Ok(documents)
}

/// First document whose `kind` field matches, if any. A missing kind is not
/// an error here: the caller decides whether the absence is fatal.
pub fn find_by_kind<'a>(documents: &'a [Value], kind: &str) -> Option<&'a Value> {
    documents
        .iter()
        .find(|document| document.get("kind").and_then(Value::as_str) == Some(kind))
}

/// Decode one raw document into its typed manifest.
pub fn decode<T: DeserializeOwned>(document: &Value, kind: &str) -> Result<T, TemplateError> {
    serde_yaml::from_value(document.clone()).map_err(|source| TemplateError::Decode {
        kind: kind.to_string(),
        source,
    })
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaktError {
    // Resolution errors
    #[error("unable to parse version constraint {constraint}: {reason}")]
    ConstraintParse { constraint: String, reason: String },

    #[error("unable to parse version {version} of dependency {id}: {reason}")]
    VersionParse {
        id: String,
        version: String,
        reason: String,
    },

    #[error("no valid dependencies for {id}, {constraint}, and {stack} in {catalog}")]
    NoValidDependency {
        id: String,
        constraint: String,
        stack: String,
        catalog: String,
    },

    // Cache errors
    #[error("sha256 for {uri} {actual} does not match expected {expected}")]
    IntegrityMismatch {
        uri: String,
        expected: String,
        actual: String,
    },

    #[error("invalid sha256 digest {digest:?}: expected 64 lowercase hex characters")]
    InvalidDigest { digest: String },

    // Network errors
    #[error("unable to download {uri}: {reason}")]
    Download { uri: String, reason: String },

    #[error("could not download {uri}: {status}")]
    HttpStatus { uri: String, status: u16 },

    // Archive errors
    #[error("invalid archive: {0}")]
    ArchiveFormat(String),

    // Catalog errors
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to decode TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("unable to encode TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // Manifest errors
    #[error("listing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, PaktError>;

impl From<reqwest::Error> for PaktError {
    fn from(err: reqwest::Error) -> Self {
        let uri = err.url().map(|u| u.to_string()).unwrap_or_default();
        PaktError::Download {
            uri,
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_is_kept_verbatim() {
        let err: PaktError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        match err {
            PaktError::Io(inner) => assert_eq!(inner.kind(), std::io::ErrorKind::NotFound),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_messages() {
        let err = PaktError::HttpStatus {
            uri: "https://example.com/a.tgz".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "could not download https://example.com/a.tgz: 404");

        let err = PaktError::IntegrityMismatch {
            uri: "u".to_string(),
            expected: "a".to_string(),
            actual: "b".to_string(),
        };
        assert_eq!(err.to_string(), "sha256 for u b does not match expected a");
    }
}

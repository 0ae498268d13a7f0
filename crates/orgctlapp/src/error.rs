use std::fmt;
use thiserror::Error;

/// The pipeline stage an error surfaced from, used to tell the caller which
/// step of a multi-step operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResolveUser,
    ResolvePermissionSet,
    ResolveGroup,
    Assign,
    Upload,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ResolveUser => "resolve-user",
            Stage::ResolvePermissionSet => "resolve-permission-set",
            Stage::ResolveGroup => "resolve-group",
            Stage::Assign => "assign",
            Stage::Upload => "upload",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum OrgError {
    #[error("No {object} found where {criteria}")]
    NotFound { object: String, criteria: String },

    #[error("{} {object} records match {criteria}: {}", candidates.len(), candidates.join(", "))]
    AmbiguousResult {
        object: String,
        criteria: String,
        candidates: Vec<String>,
    },

    #[error("{object} write rejected ({code}): {message}")]
    WriteRejected {
        object: String,
        code: String,
        message: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{stage} failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<OrgError>,
    },
}

impl OrgError {
    /// Tags this error with the stage it came from.
    pub fn at(self, stage: Stage) -> Self {
        OrgError::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// The underlying classification with any stage wrappers peeled off.
    pub fn root(&self) -> &OrgError {
        match self {
            OrgError::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    /// Short name of the underlying error kind, e.g. `NotFound`.
    pub fn kind(&self) -> &'static str {
        match self.root() {
            OrgError::NotFound { .. } => "NotFound",
            OrgError::AmbiguousResult { .. } => "AmbiguousResult",
            OrgError::WriteRejected { .. } => "WriteRejected",
            OrgError::Transport(_) => "Transport",
            OrgError::Http { .. } => "Http",
            OrgError::InvalidInput(_) => "InvalidInput",
            OrgError::Config(_) => "Config",
            OrgError::Io(_) => "Io",
            OrgError::Serialization(_) => "Serialization",
            OrgError::Stage { .. } => "Stage",
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            OrgError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for OrgError {
    fn from(err: reqwest::Error) -> Self {
        OrgError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OrgError>;

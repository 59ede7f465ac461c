//! Error types for channel orchestration

use thiserror::Error;

/// Failure reported by a resource service (table, queue, topic, parameter, binding)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CloudError {
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("{kind} already exists: {name}")]
    AlreadyExists { kind: &'static str, name: String },

    #[error("Invalid request: {0}")]
    Invalid(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Channel id {0} is already registered")]
    DuplicateId(i64),

    #[error("Registry backend error: {0}")]
    Backend(String),
}

/// Stable classification of every orchestration failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Remote,
    Registry,
    Configuration,
    Runtime,
}

impl ErrorKind {
    const ALL: [ErrorKind; 7] = [
        ErrorKind::Validation,
        ErrorKind::NotFound,
        ErrorKind::Conflict,
        ErrorKind::Remote,
        ErrorKind::Registry,
        ErrorKind::Configuration,
        ErrorKind::Runtime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Remote => "remote",
            ErrorKind::Registry => "registry",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Runtime => "runtime",
        }
    }
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Step '{step}' failed: {source}")]
    Remote {
        step: &'static str,
        #[source]
        source: CloudError,
    },

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A failure that came back from a workflow instance
    #[error("{message}")]
    Reported { kind: ErrorKind, message: String },
}

impl ChannelError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChannelError::Validation(_) => ErrorKind::Validation,
            ChannelError::NotFound(_) => ErrorKind::NotFound,
            ChannelError::Conflict(_) => ErrorKind::Conflict,
            ChannelError::Remote { .. } => ErrorKind::Remote,
            ChannelError::Registry(_) => ErrorKind::Registry,
            ChannelError::Configuration(_) => ErrorKind::Configuration,
            ChannelError::Reported { kind, .. } => *kind,
        }
    }

    /// Workflow errors travel as strings; the kind rides along as a `[kind] ` tag
    pub fn to_wire(&self) -> String {
        format!("[{}] {}", self.kind().as_str(), self)
    }

    /// Recover a tagged error. The runtime may wrap the text, so the tag is
    /// searched for anywhere; untagged text is a runtime failure.
    pub fn from_wire(text: &str) -> ChannelError {
        let tagged = ErrorKind::ALL
            .iter()
            .filter_map(|kind| {
                let tag = format!("[{}] ", kind.as_str());
                text.find(&tag).map(|at| (at, *kind, at + tag.len()))
            })
            .min_by_key(|(at, _, _)| *at);

        match tagged {
            Some((_, kind, start)) => ChannelError::Reported {
                kind,
                message: text[start..].to_string(),
            },
            None => ChannelError::runtime(text),
        }
    }

    /// A failure of the workflow runtime itself
    pub fn runtime(message: impl Into<String>) -> ChannelError {
        ChannelError::Reported {
            kind: ErrorKind::Runtime,
            message: message.into(),
        }
    }

    /// Wrap a service failure with the step that produced it
    pub fn remote(step: &'static str) -> impl FnOnce(CloudError) -> ChannelError {
        move |source| ChannelError::Remote { step, source }
    }

    /// Like [`ChannelError::remote`], but a name clash is a conflict
    pub fn creating(step: &'static str) -> impl FnOnce(CloudError) -> ChannelError {
        move |source| match source {
            CloudError::AlreadyExists { kind, name } => {
                ChannelError::Conflict(format!("{} '{}' already exists", kind, name))
            }
            other => ChannelError::Remote { step, source: other },
        }
    }
}

impl From<ChannelError> for String {
    fn from(err: ChannelError) -> Self {
        err.to_wire()
    }
}

pub type Result<T, E = ChannelError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_carries_step() {
        let err = ChannelError::remote("create-queue")(CloudError::Unavailable("boom".into()));
        assert_eq!(err.kind(), ErrorKind::Remote);
        assert_eq!(err.to_string(), "Step 'create-queue' failed: Service unavailable: boom");
    }

    #[test]
    fn test_name_clash_on_create_is_conflict() {
        let err = ChannelError::creating("create-table")(CloudError::AlreadyExists {
            kind: "table",
            name: "fooTable".into(),
        });
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.to_string(), "table 'fooTable' already exists");
    }

    #[test]
    fn test_registry_error_converts() {
        let err: ChannelError = RegistryError::DuplicateId(4).into();
        assert_eq!(err.kind().as_str(), "registry");
    }

    #[test]
    fn test_wire_form_keeps_kind_and_message() {
        let err = ChannelError::Conflict("channel name 'foo' is taken".into());
        let back = ChannelError::from_wire(&err.to_wire());
        assert_eq!(back.kind(), ErrorKind::Conflict);
        assert_eq!(back.to_string(), "channel name 'foo' is taken");
    }

    #[test]
    fn test_wire_tag_found_inside_wrapped_text() {
        let wrapped = "orchestration failed: [not_found] channel id 9 not found";
        let err = ChannelError::from_wire(wrapped);
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "channel id 9 not found");
    }

    #[test]
    fn test_untagged_text_is_runtime_failure() {
        let err = ChannelError::from_wire("worker lock expired");
        assert_eq!(err.kind(), ErrorKind::Runtime);
    }
}

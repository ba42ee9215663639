use std::path::PathBuf;
use thiserror::Error;

use crate::contract::StoreError;

/// Errors that abort a staging run.
#[derive(Error, Debug)]
pub enum DeployError {
    /// Neither the job nor the deployment declares a script prefix.
    #[error("job '{job}': either scriptS3LocationPrefix or s3Prefix must be specified")]
    MissingScriptPrefix { job: String },

    /// A support file entry lacks one of its four required fields.
    #[error("job '{job}': support file #{index} is missing {missing}; please provide all parameters for SupportFiles")]
    IncompleteSupportFile {
        job: String,
        index: usize,
        missing: String,
    },

    /// A job or trigger name has no letters or digits to build a logical ID from.
    #[error("'{name}' does not yield a resource name; use letters or digits, or set resourceName")]
    EmptyResourceName { name: String },

    /// Reading a local artifact failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The object store rejected an operation.
    #[error("object store {operation} failed for {target}: {source}")]
    Store {
        operation: &'static str,
        target: String,
        #[source]
        source: StoreError,
    },
}

impl DeployError {
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DeployError::MissingScriptPrefix { .. }
                | DeployError::IncompleteSupportFile { .. }
                | DeployError::EmptyResourceName { .. }
        )
    }
}

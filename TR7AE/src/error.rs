//! Error types for `TR7AE`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `TR7AE` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization of a scene failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ==================== Container Errors ====================
    /// Wrong magic or version; the file is not of the requested type.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// What the reader was looking for.
        expected: &'static str,
        /// What was found instead.
        found: String,
    },

    /// A section table, relocation table or payload field is out of range.
    #[error("malformed container: {message}")]
    MalformedContainer {
        /// Description of the violated constraint.
        message: String,
    },

    // ==================== Texture Errors ====================
    /// The texture uses a pixel format code this library cannot decode.
    #[error("unsupported pixel format: {code:#x}")]
    UnsupportedPixelFormat {
        /// The raw format code from the texture header.
        code: u32,
    },

    /// Failed to encode or decode a PNG image.
    #[error("image error: {message}")]
    Image {
        /// The error message from the image codec.
        message: String,
    },

    // ==================== Export Errors ====================
    /// A hard limit of the mesh format would be exceeded.
    #[error("export limit exceeded: {limit} is {actual}, maximum is {max}")]
    ExportLimitExceeded {
        /// Which limit was violated.
        limit: &'static str,
        /// The value found in the model.
        actual: usize,
        /// The largest accepted value.
        max: usize,
    },

    /// A submesh name does not follow `Mesh_<n>_tpageid_<id>_dg_<group>`.
    #[error("submesh name '{name}' is invalid: {reason}")]
    NamingConvention {
        /// The offending submesh name.
        name: String,
        /// Which part of the convention it breaks.
        reason: String,
    },

    /// The scene cannot be laid out as a mesh section.
    #[error("invalid model: {message}")]
    InvalidModel {
        /// What is wrong with the model.
        message: String,
    },

    /// The reference file needed for export could not be found.
    #[error("reference template not found: {path}")]
    MissingReferenceTemplate {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// The reference file exists but cannot serve as a template.
    #[error("invalid reference template: {message}")]
    InvalidTemplate {
        /// Why the template was rejected.
        message: String,
    },
}

impl Error {
    /// Shorthand for [`Error::MalformedContainer`].
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedContainer {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::InvalidModel`].
    pub(crate) fn model(message: impl Into<String>) -> Self {
        Self::InvalidModel {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::InvalidTemplate`].
    pub(crate) fn template(message: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            message: message.into(),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Self::Image {
            message: err.to_string(),
        }
    }
}

/// A specialized Result type for `TR7AE` operations.
pub type Result<T> = std::result::Result<T, Error>;

use std::path::PathBuf;

use thiserror::Error;

use crate::shared::region::Region;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("decode failed for {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("configuration error: kernel size must be a positive odd integer, got {0}")]
    InvalidKernelSize(i64),
    #[error("processing error: region list is not an exact cover: {0}")]
    InvalidPartition(String),
    #[error("processing error: source is {source_dims:?} but destination is {dest_dims:?}")]
    DimensionMismatch {
        source_dims: (u32, u32),
        dest_dims: (u32, u32),
    },
    #[error("processing error: worker failed on {region:?}: {message}")]
    WorkerFault { region: Region, message: String },
    #[error("processing error: filter run was cancelled")]
    Cancelled,
    #[error("encode failed for {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl FilterError {
    /// Name of the pipeline stage that failed, for diagnostics.
    pub fn stage(&self) -> &'static str {
        match self {
            FilterError::Decode { .. } => "decode",
            FilterError::InvalidKernelSize(_) => "configuration",
            FilterError::InvalidPartition(_)
            | FilterError::DimensionMismatch { .. }
            | FilterError::WorkerFault { .. }
            | FilterError::Cancelled => "processing",
            FilterError::Encode { .. } => "encode",
        }
    }
}

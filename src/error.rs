// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error taxonomy for the fastener pipeline

use thiserror::Error;

/// Errors raised while generating or exporting a fastener kit.
///
/// `GeometryDegenerate` is recoverable: the solid builders report it and the
/// part assemblers fall back to a simpler shape. The remaining variants are
/// fatal for the call that produced them.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FastenerError {
    /// A parameter violates the data model invariants.
    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParams { field: &'static str, reason: String },

    /// A profile, extrusion or boolean step produced unusable geometry.
    #[error("degenerate geometry in {stage}: {details}")]
    GeometryDegenerate { stage: &'static str, details: String },

    /// Merge or export received zero triangles.
    #[error("empty result for {part} during {stage}")]
    EmptyResult { part: String, stage: &'static str },

    /// An export target could not be encoded from otherwise valid geometry.
    #[error("{format} serialization failed: {details}")]
    Serialization { format: &'static str, details: String },

    /// Batch layout bookkeeping failed.
    #[error("layout error: {details}")]
    Layout { details: String },

    /// Configuration could not be loaded.
    #[error("configuration error: {details}")]
    Config { details: String },
}

impl FastenerError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParams {
            field,
            reason: reason.into(),
        }
    }

    pub fn degenerate(stage: &'static str, details: impl Into<String>) -> Self {
        Self::GeometryDegenerate {
            stage,
            details: details.into(),
        }
    }

    pub fn empty(part: impl Into<String>, stage: &'static str) -> Self {
        Self::EmptyResult {
            part: part.into(),
            stage,
        }
    }

    pub fn serialization(format: &'static str, details: impl ToString) -> Self {
        Self::Serialization {
            format,
            details: details.to_string(),
        }
    }

    /// True for failures the pipeline recovers from locally.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::GeometryDegenerate { .. })
    }
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, FastenerError>;

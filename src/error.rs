//! Configuration errors.
//!
//! Rendering and navigation never fail; only a malformed [`Options`](crate::Options) is rejected.

/// Reasons an [`Options`](crate::Options) value cannot drive a render pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionsError {
    #[error("references heading text must not be empty")]
    EmptyReferencesHeading,

    #[error("references delimiter must not be empty")]
    EmptyDelimiter,

    #[error("references delimiter {delimiter:?} does not contain heading text {heading:?}")]
    DelimiterMissingHeading { delimiter: String, heading: String },

    #[error("footnote anchor prefix must not be empty")]
    EmptyAnchorPrefix,
}

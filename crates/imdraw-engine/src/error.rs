use thiserror::Error;

use crate::draw::TextureId;

/// Errors surfaced by the renderer core.
///
/// None of these are retried internally; the caller decides whether the
/// frame (or the renderer) is abandoned.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A GPU buffer, texture, layout, sampler or pipeline could not be created.
    #[error("failed to allocate {resource}: {reason}")]
    ResourceAllocation {
        resource: &'static str,
        reason: String,
    },

    /// A draw command referenced a texture handle with no registered binding.
    #[error("draw command references unregistered texture {0}")]
    UnregisteredBinding(TextureId),

    /// The byte size required for a buffer is not representable.
    #[error("{resource} size overflows for {requested} elements")]
    CapacityOverflow {
        resource: &'static str,
        requested: usize,
    },

    /// Every dynamic texture handle value has been handed out.
    #[error("texture handle space exhausted")]
    HandleSpaceExhausted,

    /// `update` / `render` were called out of order.
    #[error("frame out of order: {0}")]
    FrameOrder(&'static str),

    /// The toolkit's font atlas pixels do not match its declared dimensions.
    #[error("invalid font atlas: {0}")]
    InvalidFontAtlas(String),

    /// GPU resources were already released by teardown.
    #[error("renderer resources already released")]
    Destroyed,
}

impl RenderError {
    pub(crate) fn allocation(resource: &'static str, reason: impl Into<String>) -> Self {
        Self::ResourceAllocation {
            resource,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;

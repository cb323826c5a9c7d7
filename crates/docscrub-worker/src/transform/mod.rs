//! Built-in transformers.

pub mod command;
pub mod passthrough;

use std::sync::Arc;

use docscrub_core::config::{ProcessingConfig, TransformerKind};
use docscrub_core::traits::Transformer;

pub use command::CommandTransformer;
pub use passthrough::PassthroughTransformer;

/// Build the transformer selected by configuration.
pub fn from_config(config: &ProcessingConfig) -> Arc<dyn Transformer> {
    match config.transformer {
        TransformerKind::Passthrough => Arc::new(PassthroughTransformer),
        TransformerKind::Command => Arc::new(CommandTransformer::from_config(&config.command)),
    }
}

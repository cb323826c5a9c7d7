//! Copies the input unchanged. Used when no external engine is configured.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use docscrub_core::traits::{TransformError, TransformRequest, Transformer};

/// Transformer that writes a byte-for-byte copy of the input.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTransformer;

#[async_trait]
impl Transformer for PassthroughTransformer {
    fn name(&self) -> &str {
        "passthrough"
    }

    async fn transform(
        &self,
        request: TransformRequest,
        cancel: CancellationToken,
    ) -> Result<PathBuf, TransformError> {
        if cancel.is_cancelled() {
            return Err(TransformError::Cancelled);
        }
        tokio::fs::copy(&request.input, &request.output).await?;
        Ok(request.output)
    }
}

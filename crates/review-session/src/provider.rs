//! Provider seams. The session only sees these traits, so tests can swap in
//! canned responses.

use fen_core::analysis::{AnalysisRequest, AnalysisResponse};
use fen_core::Position;

use crate::error::ProviderError;

#[allow(async_fn_in_trait)]
pub trait AnalysisProvider {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, ProviderError>;
}

#[allow(async_fn_in_trait)]
pub trait RecognitionProvider {
    /// Recognize the board in a photo. The result has already been through
    /// the lenient parser, so only the placement is meaningful.
    async fn recognize(&self, image: Vec<u8>, file_name: &str) -> Result<Position, ProviderError>;
}

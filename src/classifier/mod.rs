pub mod ai;
pub mod heuristic;

use crate::{error::Result, models::Analysis};
use async_trait::async_trait;

pub use ai::BedrockAnalyzer;
pub use heuristic::{heuristic_analysis, HeuristicClassifier};

/// Turns a title into template choice and copy.
///
/// The preview path always uses [`HeuristicClassifier`]; full generation uses
/// whichever implementation the pipeline was built with.
#[async_trait]
pub trait TitleClassifier: Send + Sync {
    fn name(&self) -> &str;

    async fn classify(&self, title: &str) -> Result<Analysis>;
}

use async_trait::async_trait;
use kioskfeed_core::{AnalysisContent, AnalysisResult};
use tracing::info;

/// Screen output. Drawing itself lives outside this crate.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn show_result(&self, result: &AnalysisResult);
    async fn show_idle(&self);
}

/// Logs what would be on screen.
#[derive(Debug, Default)]
pub struct TracingRenderer;

#[async_trait]
impl Renderer for TracingRenderer {
    async fn show_result(&self, result: &AnalysisResult) {
        let tips = match &result.content {
            AnalysisContent::Html { tips, .. } => tips.matches("<li").count(),
            AnalysisContent::Tips { items } => items.len(),
        };
        info!(
            id = %result.id,
            company = %result.company_name,
            title = %result.vacancy_title,
            score = ?result.score,
            tips,
            fallback = result.is_fallback(),
            "Showing result"
        );
    }

    async fn show_idle(&self) {
        info!("Showing intake screen");
    }
}

//! Per-paper analysis prompts.

use super::LanguageModel;
use crate::models::{Analysis, PageResult};
use std::sync::Arc;
use tracing::{debug, warn};

/// Asks the language model about one extracted page at a time.
pub struct PaperAnalyzer {
    model: Arc<dyn LanguageModel>,
}

impl PaperAnalyzer {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Analyze a page. A failed model call becomes [`Analysis::Failed`].
    pub async fn analyze(&self, paper: &PageResult) -> Analysis {
        debug!("Analyzing {}", paper.link);

        match self.model.complete(&build_prompt(paper)).await {
            Ok(text) => Analysis::Completed(text),
            Err(e) => {
                warn!("Analysis of {} failed: {}", paper.link, e);
                Analysis::Failed(e.to_string())
            }
        }
    }
}

/// Render the analysis prompt for one page.
pub fn build_prompt(paper: &PageResult) -> String {
    format!(
        r#"
Please analyze this research paper/article and provide:
1. Key findings
2. Main methodology
3. Potential relevance to the research topic

Paper Title: {}
Paper Link: {}
Description: {}

Please be concise and focus on the most important points.
If the content is not accessible or unclear, please indicate that in your analysis.
"#,
        paper.title, paper.link, paper.body
    )
}

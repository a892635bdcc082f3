use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::providers::{AiProvider, ChatMessage, OpenAiProvider};
use crate::config::LlmConfig;
use crate::paper::{Paper, PaperWithSummary};
use crate::{Error, Result};

const SYSTEM_PROMPT: &str = "你是一个专业的学术论文分析助手。";

fn build_prompt(paper_text: &str) -> String {
    format!("用中文帮我介绍一下这篇文章: {}", paper_text)
}

/// Per-item result of [`LlmSummarizer::process_settled`]
#[derive(Debug)]
pub enum SummaryOutcome {
    Summarized(PaperWithSummary),
    Failed { paper: Paper, error: Error },
}

impl SummaryOutcome {
    pub fn paper(&self) -> &Paper {
        match self {
            SummaryOutcome::Summarized(p) => &p.paper,
            SummaryOutcome::Failed { paper, .. } => paper,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SummaryOutcome::Summarized(_))
    }
}

/// Generates Chinese summaries for batches of papers with bounded concurrency.
///
/// The semaphore is owned by the summarizer, so the in-flight limit also holds
/// across concurrent calls to [`process`](Self::process) on a shared instance.
pub struct LlmSummarizer {
    provider: Arc<dyn AiProvider>,
    semaphore: Arc<Semaphore>,
    max_concurrent: usize,
}

impl LlmSummarizer {
    /// Create a summarizer backed by the OpenAI-compatible endpoint in `config`
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let provider = OpenAiProvider::new(config)?;
        Ok(Self::with_provider(
            Arc::new(provider),
            config.max_concurrent_requests,
        ))
    }

    pub fn with_provider(provider: Arc<dyn AiProvider>, max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            provider,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        }
    }

    /// Get max simultaneous completion requests
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Summarize one rendered paper text
    pub async fn summarize(&self, paper_text: &str) -> Result<String> {
        summarize_gated(self.provider.as_ref(), &self.semaphore, paper_text).await
    }

    /// Summarize every paper in the batch.
    ///
    /// Output order matches input order. The first failing item aborts the
    /// whole batch and its error is returned; no partial results.
    pub async fn process(&self, items: Vec<(Paper, String)>) -> Result<Vec<PaperWithSummary>> {
        let total = items.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let (papers, texts): (Vec<Paper>, Vec<String>) = items.into_iter().unzip();
        tracing::info!(total, model = %self.model(), "Summarizing papers");

        let mut join_set = self.spawn_all(texts);
        let mut summaries: Vec<Option<String>> = vec![None; total];
        let mut done = 0;

        while let Some(joined) = join_set.join_next().await {
            let (index, result) = joined?;
            // Returning here drops the JoinSet, which aborts the remaining tasks
            let summary = result.map_err(|e| {
                tracing::warn!(paper_id = %papers[index].id, error = %e, "Summarization failed, aborting batch");
                e
            })?;
            summaries[index] = Some(summary);
            done += 1;
            tracing::debug!(done, total, paper_id = %papers[index].id, "Summarized paper");
        }

        let results = papers
            .into_iter()
            .zip(summaries)
            .map(|(paper, summary)| {
                summary
                    .map(|s| PaperWithSummary::new(paper, s))
                    .ok_or_else(|| Error::Other("summarization task produced no result".to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(total, "Summarized papers");
        Ok(results)
    }

    /// Like [`process`](Self::process), but a failing item does not affect the
    /// others. Every input yields exactly one [`SummaryOutcome`], in input order.
    /// Only a panicking task fails the call as a whole.
    pub async fn process_settled(&self, items: Vec<(Paper, String)>) -> Result<Vec<SummaryOutcome>> {
        let total = items.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let (papers, texts): (Vec<Paper>, Vec<String>) = items.into_iter().unzip();
        tracing::info!(total, model = %self.model(), "Summarizing papers");

        let mut join_set = self.spawn_all(texts);
        let mut results: Vec<Option<Result<String>>> = (0..total).map(|_| None).collect();
        let mut done = 0;

        while let Some(joined) = join_set.join_next().await {
            let (index, result) = joined?;
            done += 1;
            match &result {
                Ok(_) => tracing::debug!(done, total, paper_id = %papers[index].id, "Summarized paper"),
                Err(e) => tracing::warn!(done, total, paper_id = %papers[index].id, error = %e, "Failed to summarize paper"),
            }
            results[index] = Some(result);
        }

        let outcomes = papers
            .into_iter()
            .zip(results)
            .map(|(paper, result)| match result {
                Some(Ok(summary)) => SummaryOutcome::Summarized(PaperWithSummary::new(paper, summary)),
                Some(Err(error)) => SummaryOutcome::Failed { paper, error },
                None => SummaryOutcome::Failed {
                    paper,
                    error: Error::Other("summarization task produced no result".to_string()),
                },
            })
            .collect::<Vec<_>>();

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        tracing::info!(total, failed, "Summarized papers");
        Ok(outcomes)
    }

    fn spawn_all(&self, texts: Vec<String>) -> JoinSet<(usize, Result<String>)> {
        let mut join_set = JoinSet::new();
        for (index, text) in texts.into_iter().enumerate() {
            let provider = Arc::clone(&self.provider);
            let semaphore = Arc::clone(&self.semaphore);
            join_set.spawn(async move {
                let result = summarize_gated(provider.as_ref(), &semaphore, &text).await;
                (index, result)
            });
        }
        join_set
    }
}

async fn summarize_gated(
    provider: &dyn AiProvider,
    semaphore: &Semaphore,
    paper_text: &str,
) -> Result<String> {
    // Permit is released on drop, including on error and task abort
    let _permit = semaphore
        .acquire()
        .await
        .map_err(|e| Error::Other(format!("Concurrency gate closed: {}", e)))?;

    let messages = [
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(build_prompt(paper_text)),
    ];
    provider.chat(&messages).await
}

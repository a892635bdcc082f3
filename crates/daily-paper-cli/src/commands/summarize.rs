use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use daily_paper_core::{Config, LlmSummarizer, Paper, PaperWithSummary, SummaryOutcome};

pub async fn run(config: &Config, input: &Path, output: Option<&Path>, keep_going: bool) -> Result<()> {
    let papers = load_papers(input)?;
    if papers.is_empty() {
        eprintln!("No papers found in {}", input.display());
        return Ok(());
    }

    let summarizer = LlmSummarizer::new(&config.llm)?;
    let total = papers.len();
    let batch_size = config.process_batch_size.max(1);
    let mut summarized: Vec<PaperWithSummary> = Vec::with_capacity(total);
    let mut failed = 0usize;

    for (batch_no, chunk) in papers.chunks(batch_size).enumerate() {
        tracing::info!(
            batch = batch_no + 1,
            batches = total.div_ceil(batch_size),
            size = chunk.len(),
            "Processing batch"
        );

        let items: Vec<(Paper, String)> = chunk
            .iter()
            .map(|paper| (paper.clone(), paper.render_text()))
            .collect();

        if keep_going {
            for outcome in summarizer.process_settled(items).await? {
                match outcome {
                    SummaryOutcome::Summarized(paper) => summarized.push(paper),
                    SummaryOutcome::Failed { paper, error } => {
                        tracing::error!("Failed to summarize '{}': {}", paper.title, error);
                        failed += 1;
                    }
                }
            }
        } else {
            summarized.extend(summarizer.process(items).await?);
        }
    }

    write_results(&summarized, output)?;

    eprintln!(
        "\nSummarized {} of {} papers{}.",
        summarized.len(),
        total,
        if failed > 0 {
            format!(" ({} failed)", failed)
        } else {
            String::new()
        }
    );

    Ok(())
}

fn load_papers(path: &Path) -> Result<Vec<Paper>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read papers from {}", path.display()))?;
    let papers = serde_json::from_str(&content)
        .with_context(|| format!("Invalid paper list in {}", path.display()))?;
    Ok(papers)
}

fn write_results(results: &[PaperWithSummary], output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write results to {}", path.display()))?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }
    Ok(())
}

//! Per-article orchestration.
//!
//! Runs pattern extraction and LLM proposal over an article, reconciles the
//! two candidate streams, applies the direct-quote policy, and reports
//! per-stage timings. Articles are independent, so batches fan out across a
//! semaphore-bounded set of tasks sharing one pipeline instance.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{info, info_span, warn, Instrument};

use quotewatch_core::{
    direct_quote_sources, CandidateSource, ConfirmedSource, FilterRules, ReconciledSources,
    SourceReconciler,
};

use crate::patterns::PatternExtractor;
use crate::proposer::SourceProposer;

/// An article as delivered by the fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub body: String,
    /// Blockquote elements lifted out of the DOM, if the fetcher found any.
    #[serde(default)]
    pub blockquotes: Vec<String>,
}

/// Wall-clock timings and candidate counts for one article.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineMetrics {
    pub pattern_us: u64,
    pub proposal_us: u64,
    pub reconcile_us: u64,
    pub total_us: u64,
    pub pattern_candidates: usize,
    pub ner_candidates: usize,
}

/// Reconciliation output for one article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleReport {
    pub article_id: String,
    pub sources: ReconciledSources,
    /// Confirmed sources that pass the direct-quote policy.
    pub quoted: Vec<ConfirmedSource>,
    pub metrics: PipelineMetrics,
}

/// Shared per-process pipeline. All state is read-only after construction,
/// so one instance serves concurrent articles.
pub struct ArticlePipeline {
    extractor: PatternExtractor,
    proposer: Option<Arc<dyn SourceProposer>>,
    reconciler: SourceReconciler,
    rules: Arc<FilterRules>,
}

impl ArticlePipeline {
    pub fn new(
        extractor: PatternExtractor,
        proposer: Option<Arc<dyn SourceProposer>>,
        reconciler: SourceReconciler,
        rules: Arc<FilterRules>,
    ) -> Self {
        Self {
            extractor,
            proposer,
            reconciler,
            rules,
        }
    }

    /// Process one article end to end.
    pub async fn process(&self, article: &Article) -> ArticleReport {
        let total_start = Instant::now();
        let mut metrics = PipelineMetrics::default();

        let pattern_candidates = {
            let _span = info_span!("pattern_extraction", article_id = %article.id).entered();
            let start = Instant::now();
            let mut candidates = self.extractor.extract(&article.body);
            candidates.extend(self.extractor.extract_from_blockquotes(&article.blockquotes));
            metrics.pattern_us = start.elapsed().as_micros() as u64;
            candidates
        };
        metrics.pattern_candidates = pattern_candidates.len();

        let ner_candidates: Vec<CandidateSource> = {
            let start = Instant::now();
            let candidates = match &self.proposer {
                Some(proposer) => {
                    let proposed = proposer
                        .propose(&article.body)
                        .instrument(info_span!("source_proposal", article_id = %article.id))
                        .await;
                    match proposed {
                        Some(proposed) => proposed.iter().map(|p| p.to_candidate()).collect(),
                        None => {
                            warn!(article_id = %article.id, "source proposal unavailable, pattern-only");
                            Vec::new()
                        }
                    }
                }
                None => Vec::new(),
            };
            metrics.proposal_us = start.elapsed().as_micros() as u64;
            candidates
        };
        metrics.ner_candidates = ner_candidates.len();

        let (sources, quoted) = {
            let _span = info_span!("reconciliation", article_id = %article.id).entered();
            let start = Instant::now();
            let sources = self.reconciler.reconcile(&pattern_candidates, &ner_candidates);
            let quoted = direct_quote_sources(&sources.confirmed, &self.rules);
            metrics.reconcile_us = start.elapsed().as_micros() as u64;
            (sources, quoted)
        };

        metrics.total_us = total_start.elapsed().as_micros() as u64;
        info!(
            article_id = %article.id,
            confirmed = sources.confirmed.len(),
            filtered = sources.filtered.len(),
            quoted = quoted.len(),
            total_us = metrics.total_us,
            "article processed"
        );

        ArticleReport {
            article_id: article.id.clone(),
            sources,
            quoted,
            metrics,
        }
    }

    /// Process a batch of articles with bounded concurrency.
    ///
    /// Reports come back in input order regardless of completion order.
    pub async fn process_batch(
        self: Arc<Self>,
        articles: Vec<Article>,
        concurrency: usize,
    ) -> Vec<ArticleReport> {
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let mut handles = Vec::with_capacity(articles.len());

        for article in articles {
            let pipeline = Arc::clone(&self);
            let semaphore = Arc::clone(&semaphore);
            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("batch semaphore closed while tasks are live");
                pipeline.process(&article).await
            }));
        }

        let mut reports = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(err) => warn!(error = %err, "article task panicked"),
            }
        }
        reports
    }
}

//! Snapshot analysis
//!
//! Downstream consumers score a captured snapshot along named dimensions.
//! This module supplies the seam and the concurrent dispatch: registered
//! calculators fan out over one immutable snapshot through a bounded worker
//! pool. The calculators themselves are supplied by the caller.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::core::{FetchError, PageSnapshot, Result};

const DEFAULT_WORKERS: usize = 4;

/// The result of scoring one dimension of a snapshot
#[derive(Debug, Clone, serde::Serialize)]
pub struct DimensionReport {
    /// Dimension name, matching the calculator that produced it
    pub dimension: String,
    /// Calculator-defined findings
    pub findings: serde_json::Value,
}

/// One scoring dimension over an immutable snapshot.
///
/// Calculators only read the snapshot, which is what makes the concurrent
/// fan-out safe without locks.
#[async_trait]
pub trait DimensionCalculator: Send + Sync {
    /// Unique dimension name used for registration and dispatch
    fn name(&self) -> &str;

    /// Score the snapshot along this dimension
    async fn calculate(&self, snapshot: Arc<PageSnapshot>) -> Result<DimensionReport>;
}

/// Dispatches registered calculators concurrently over a snapshot
pub struct QaAnalyzer {
    calculators: Vec<Arc<dyn DimensionCalculator>>,
    max_workers: usize,
}

impl QaAnalyzer {
    pub fn new() -> Self {
        Self {
            calculators: Vec::new(),
            max_workers: DEFAULT_WORKERS,
        }
    }

    /// Cap the number of calculators running at once
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Register a calculator under its own dimension name
    pub fn register(&mut self, calculator: Arc<dyn DimensionCalculator>) {
        self.calculators.push(calculator);
    }

    /// Names of all registered dimensions, in registration order
    pub fn dimensions(&self) -> Vec<&str> {
        self.calculators.iter().map(|c| c.name()).collect()
    }

    /// Run the requested dimensions concurrently over the snapshot.
    ///
    /// An empty request runs every registered calculator. Requesting an
    /// unregistered dimension is an error. Reports come back in request
    /// order regardless of completion order.
    pub async fn analyze(
        &self,
        snapshot: PageSnapshot,
        dimensions: &[String],
    ) -> Result<Vec<DimensionReport>> {
        let selected: Vec<Arc<dyn DimensionCalculator>> = if dimensions.is_empty() {
            self.calculators.clone()
        } else {
            dimensions
                .iter()
                .map(|name| {
                    self.calculators
                        .iter()
                        .find(|c| c.name() == name)
                        .cloned()
                        .ok_or_else(|| FetchError::analysis(format!("Unknown dimension: {name}")))
                })
                .collect::<Result<Vec<_>>>()?
        };

        info!(url = %snapshot.url, count = selected.len(), "analyzing snapshot");
        let snapshot = Arc::new(snapshot);
        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut tasks = JoinSet::new();

        for (index, calculator) in selected.into_iter().enumerate() {
            let snapshot = Arc::clone(&snapshot);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| FetchError::analysis("worker pool closed"))?;
                debug!(dimension = calculator.name(), "running calculator");
                let report = calculator.calculate(snapshot).await?;
                Ok::<_, FetchError>((index, report))
            });
        }

        let mut reports: Vec<Option<DimensionReport>> = (0..tasks.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            let (index, report) =
                joined.map_err(|e| FetchError::analysis(format!("Calculator panicked: {e}")))??;
            reports[index] = Some(report);
        }

        Ok(reports.into_iter().flatten().collect())
    }
}

impl Default for QaAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PageHeaders;

    struct WordCount;

    #[async_trait]
    impl DimensionCalculator for WordCount {
        fn name(&self) -> &str {
            "word-count"
        }

        async fn calculate(&self, snapshot: Arc<PageSnapshot>) -> Result<DimensionReport> {
            let words = snapshot.html.split_whitespace().count();
            Ok(DimensionReport {
                dimension: self.name().to_string(),
                findings: serde_json::json!({ "words": words }),
            })
        }
    }

    struct TitlePresent;

    #[async_trait]
    impl DimensionCalculator for TitlePresent {
        fn name(&self) -> &str {
            "title-present"
        }

        async fn calculate(&self, snapshot: Arc<PageSnapshot>) -> Result<DimensionReport> {
            let has_title = snapshot.html.contains("<title>");
            Ok(DimensionReport {
                dimension: self.name().to_string(),
                findings: serde_json::json!({ "has_title": has_title }),
            })
        }
    }

    fn snapshot() -> PageSnapshot {
        PageSnapshot::new(
            "https://example.test/".to_string(),
            200,
            PageHeaders::new(),
            "<html><head><title>Hi</title></head><body>one two three</body></html>".to_string(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_reports_follow_request_order() {
        let mut analyzer = QaAnalyzer::new();
        analyzer.register(Arc::new(WordCount));
        analyzer.register(Arc::new(TitlePresent));

        let reports = analyzer
            .analyze(
                snapshot(),
                &["title-present".to_string(), "word-count".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].dimension, "title-present");
        assert_eq!(reports[1].dimension, "word-count");
    }

    #[tokio::test]
    async fn test_empty_request_runs_all_registered() {
        let mut analyzer = QaAnalyzer::new().with_max_workers(2);
        analyzer.register(Arc::new(WordCount));
        analyzer.register(Arc::new(TitlePresent));

        let reports = analyzer.analyze(snapshot(), &[]).await.unwrap();
        assert_eq!(reports.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_dimension_is_an_error() {
        let mut analyzer = QaAnalyzer::new();
        analyzer.register(Arc::new(WordCount));

        let err = analyzer
            .analyze(snapshot(), &["accessibility".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Analysis(_)));
    }
}

//! Ordered fallback chains.
//!
//! A chain is a list of stages tried in order. The first stage that returns `Ok`
//! wins; a failing stage hands the same input to the next one. When every stage
//! fails the caller gets all failures back, in order, and decides what to surface.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

/// One tier of a fallback chain.
#[async_trait]
pub trait Stage<I, O, E>: Send + Sync
where
    I: ?Sized + Sync,
{
    /// Short stable name used in logs.
    fn name(&self) -> &'static str;

    async fn attempt(&self, input: &I) -> Result<O, E>;
}

/// A stage failure tagged with the stage that produced it.
#[derive(Debug)]
pub struct StageFailure<E> {
    pub stage: &'static str,
    pub error: E,
}

/// Every stage failed. Failures are kept in stage order.
#[derive(Debug)]
pub struct Exhausted<E> {
    pub failures: Vec<StageFailure<E>>,
}

impl<E> Exhausted<E> {
    /// The failure of the first (primary) stage.
    pub fn into_primary(self) -> Option<E> {
        self.failures.into_iter().next().map(|f| f.error)
    }
}

pub struct FallbackChain<I: ?Sized, O, E> {
    stages: Vec<Arc<dyn Stage<I, O, E>>>,
}

impl<I, O, E> FallbackChain<I, O, E>
where
    I: ?Sized + Sync,
    E: std::fmt::Display,
{
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    pub fn then(mut self, stage: Arc<dyn Stage<I, O, E>>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Runs stages in order until one succeeds.
    pub async fn run(&self, input: &I) -> Result<(&'static str, O), Exhausted<E>> {
        let mut failures = Vec::new();

        for stage in &self.stages {
            match stage.attempt(input).await {
                Ok(output) => return Ok((stage.name(), output)),
                Err(error) => {
                    if let Some(next) = self.stages.get(failures.len() + 1) {
                        warn!(
                            "Stage '{}' failed ({error}); falling back to '{}'",
                            stage.name(),
                            next.name()
                        );
                    }
                    failures.push(StageFailure {
                        stage: stage.name(),
                        error,
                    });
                }
            }
        }

        Err(Exhausted { failures })
    }
}

impl<I, O, E> Default for FallbackChain<I, O, E>
where
    I: ?Sized + Sync,
    E: std::fmt::Display,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ?Sized, O, E> Clone for FallbackChain<I, O, E> {
    fn clone(&self) -> Self {
        Self {
            stages: self.stages.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        name: &'static str,
        result: Result<u32, String>,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(name: &'static str, result: Result<u32, String>) -> Arc<Self> {
            Arc::new(Self {
                name,
                result,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Stage<str, u32, String> for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn attempt(&self, _input: &str) -> Result<u32, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn chain_of(stages: &[Arc<Fixed>]) -> FallbackChain<str, u32, String> {
        stages
            .iter()
            .fold(FallbackChain::new(), |chain, stage| chain.then(stage.clone()))
    }

    #[tokio::test]
    async fn test_first_success_wins_and_later_stages_are_skipped() {
        let first = Fixed::new("first", Ok(1));
        let second = Fixed::new("second", Ok(2));
        let chain = chain_of(&[first, second.clone()]);

        let (stage, value) = chain.run("x").await.unwrap();
        assert_eq!((stage, value), ("first", 1));
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failure_falls_through_to_next_stage() {
        let chain = chain_of(&[
            Fixed::new("remote", Err("timeout".into())),
            Fixed::new("local", Ok(7)),
        ]);

        assert_eq!(chain.run("x").await.unwrap(), ("local", 7));
    }

    #[tokio::test]
    async fn test_exhausted_keeps_failures_in_order() {
        let chain = chain_of(&[
            Fixed::new("remote", Err("timeout".into())),
            Fixed::new("local", Err("rejected".into())),
        ]);

        let exhausted = chain.run("x").await.unwrap_err();
        let stages: Vec<_> = exhausted.failures.iter().map(|f| f.stage).collect();
        assert_eq!(stages, vec!["remote", "local"]);
        assert_eq!(exhausted.into_primary().as_deref(), Some("timeout"));
    }

    #[tokio::test]
    async fn test_empty_chain_is_exhausted() {
        let chain = chain_of(&[]);
        let exhausted = chain.run("x").await.unwrap_err();
        assert!(exhausted.failures.is_empty());
        assert!(exhausted.into_primary().is_none());
    }
}

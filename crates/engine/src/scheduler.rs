//! Stage 2: the bounded-concurrency translation scheduler.
//!
//! Distinct texts are partitioned into batches; batches run
//! concurrently with each other and every call inside a batch runs
//! concurrently too, all sharing one semaphore so no more than the
//! configured number of translation calls is ever in flight. Transient
//! failures are retried with exponential backoff and then degrade to
//! passthrough, so the deck is never left with missing text.

use crate::error::EngineError;
use crate::translator::{TranslateError, Translator};
use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::sleep;

/// Mapping from distinct original text to translated text.
///
/// Exactly one entry per distinct source string: identical source text
/// anywhere in the deck shares one translation, and every shape that
/// carries it consumes the same entry.
pub type TranslationMap = HashMap<String, String>;

/// Scheduler tuning knobs.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Maximum simultaneous translation calls.
    pub max_concurrent: usize,

    /// Texts per batch. Batch boundaries are logging granularity, not
    /// a scheduling barrier.
    pub batch_size: usize,

    /// Retries after the first attempt of a transiently failing call.
    pub max_retries: u32,

    /// Backoff base; attempt `n` waits `base * 2^n`.
    pub retry_base_delay: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 10,
            batch_size: 10,
            max_retries: 2,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

/// Terminal state of one unit after retries.
enum Outcome {
    Translated(String),
    /// Retries exhausted; the unit falls back to its original text.
    Degraded,
    /// Non-retryable failure.
    Fatal(String),
}

/// Translate every distinct text in `texts` into `target_language`.
///
/// The returned map covers every distinct input text, successful or
/// degraded, before this function returns; callers may rely on that
/// as the stage barrier. Fails only when an entire batch reports
/// non-retryable failures, which means the transport itself is down.
pub async fn translate_texts(
    translator: &dyn Translator,
    texts: &[String],
    target_language: &str,
    config: &SchedulerConfig,
) -> Result<TranslationMap, EngineError> {
    let mut seen = HashSet::new();
    let distinct: Vec<&String> = texts.iter().filter(|t| seen.insert(t.as_str())).collect();

    if distinct.is_empty() {
        return Ok(TranslationMap::new());
    }

    let batch_size = config.batch_size.max(1);
    let batches: Vec<&[&String]> = distinct.chunks(batch_size).collect();
    let total_batches = batches.len();

    log::info!(
        "Translating {} distinct texts in {} batches (concurrency {})",
        distinct.len(),
        total_batches,
        config.max_concurrent
    );

    let semaphore = Arc::new(Semaphore::new(config.max_concurrent.max(1)));

    let batch_tasks = batches.into_iter().enumerate().map(|(batch_index, batch)| {
        let semaphore = Arc::clone(&semaphore);
        async move {
            let calls = batch.iter().map(|text| {
                let semaphore = Arc::clone(&semaphore);
                async move {
                    let outcome =
                        translate_single(translator, text, target_language, config, semaphore)
                            .await;
                    (text.as_str(), outcome)
                }
            });

            let results = join_all(calls).await;
            let succeeded = results
                .iter()
                .filter(|(_, o)| matches!(o, Outcome::Translated(_)))
                .count();
            log::info!(
                "Batch {}/{} complete ({}/{} succeeded)",
                batch_index + 1,
                total_batches,
                succeeded,
                results.len()
            );
            results
        }
    });

    let mut map = TranslationMap::new();
    for batch_results in join_all(batch_tasks).await {
        let all_fatal = !batch_results.is_empty()
            && batch_results
                .iter()
                .all(|(_, o)| matches!(o, Outcome::Fatal(_)));
        if all_fatal {
            let reason = batch_results
                .iter()
                .find_map(|(_, o)| match o {
                    Outcome::Fatal(msg) => Some(msg.clone()),
                    _ => None,
                })
                .unwrap_or_default();
            return Err(EngineError::TransportUnusable(reason));
        }

        for (text, outcome) in batch_results {
            let translated = match outcome {
                Outcome::Translated(t) => t,
                // Degrade, never drop: the shape keeps its source text.
                Outcome::Degraded | Outcome::Fatal(_) => text.to_string(),
            };
            map.insert(text.to_string(), translated);
        }
    }

    Ok(map)
}

/// One unit: acquire a permit, call with bounded retry and backoff.
async fn translate_single(
    translator: &dyn Translator,
    text: &str,
    target_language: &str,
    config: &SchedulerConfig,
    semaphore: Arc<Semaphore>,
) -> Outcome {
    // The semaphore is never closed while tasks run.
    let _permit = match semaphore.acquire().await {
        Ok(permit) => permit,
        Err(_) => return Outcome::Fatal("concurrency limiter closed".to_string()),
    };

    for attempt in 0..=config.max_retries {
        match translator.translate(text, target_language).await {
            Ok(translated) => return Outcome::Translated(translated),
            Err(TranslateError::Transient(msg)) => {
                if attempt < config.max_retries {
                    let wait = config.retry_base_delay * 2u32.pow(attempt);
                    log::warn!(
                        "Retry {}/{} for {:?}: {}",
                        attempt + 1,
                        config.max_retries,
                        preview(text),
                        msg
                    );
                    sleep(wait).await;
                } else {
                    log::error!("Giving up on {:?} after retries: {}", preview(text), msg);
                    return Outcome::Degraded;
                }
            }
            Err(TranslateError::Fatal(msg)) => {
                log::error!("Non-retryable failure for {:?}: {}", preview(text), msg);
                return Outcome::Fatal(msg);
            }
        }
    }

    Outcome::Degraded
}

/// Short text preview for log lines.
fn preview(text: &str) -> String {
    let mut p: String = text.chars().take(20).collect();
    if p.len() < text.len() {
        p.push('…');
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Uppercases input; counts calls and tracks peak concurrency.
    struct MockTranslator {
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        fail_first: usize,
        fatal: bool,
    }

    impl MockTranslator {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                fail_first: 0,
                fatal: false,
            }
        }

        fn failing(times: usize) -> Self {
            Self {
                fail_first: times,
                ..Self::new()
            }
        }

        fn fatal() -> Self {
            Self {
                fatal: true,
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl Translator for MockTranslator {
        async fn translate(
            &self,
            text: &str,
            _target_language: &str,
        ) -> Result<String, TranslateError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fatal {
                return Err(TranslateError::Fatal("bad credentials".to_string()));
            }
            if call < self.fail_first {
                return Err(TranslateError::Transient("rate limited".to_string()));
            }
            Ok(text.to_uppercase())
        }
    }

    fn fast_config() -> SchedulerConfig {
        SchedulerConfig {
            retry_base_delay: Duration::from_millis(1),
            ..SchedulerConfig::default()
        }
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_dedup_translates_each_distinct_text_once() {
        let translator = MockTranslator::new();
        let input = texts(&["hello", "world", "hello", "hello"]);

        let map = translate_texts(&translator, &input, "German", &fast_config())
            .await
            .unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map["hello"], "HELLO");
        assert_eq!(translator.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_degrades_to_passthrough_after_retries() {
        let translator = MockTranslator::failing(usize::MAX);
        let input = texts(&["untranslatable"]);

        let map = translate_texts(&translator, &input, "German", &fast_config())
            .await
            .unwrap();

        assert_eq!(map["untranslatable"], "untranslatable");
        // Initial attempt plus max_retries.
        assert_eq!(translator.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_transient_failure_recovers_on_retry() {
        let translator = MockTranslator::failing(1);
        let input = texts(&["flaky"]);

        let map = translate_texts(&translator, &input, "German", &fast_config())
            .await
            .unwrap();

        assert_eq!(map["flaky"], "FLAKY");
    }

    #[tokio::test]
    async fn test_concurrency_bound_is_never_exceeded() {
        let translator = MockTranslator::new();
        let input: Vec<String> = (0..40).map(|i| format!("text {i}")).collect();
        let config = SchedulerConfig {
            max_concurrent: 3,
            batch_size: 5,
            ..fast_config()
        };

        let map = translate_texts(&translator, &input, "German", &config)
            .await
            .unwrap();

        assert_eq!(map.len(), 40);
        assert!(translator.peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_fully_fatal_batch_aborts_pipeline() {
        let translator = MockTranslator::fatal();
        let input = texts(&["a", "b", "c"]);

        let result = translate_texts(&translator, &input, "German", &fast_config()).await;
        assert!(matches!(result, Err(EngineError::TransportUnusable(_))));
    }

    #[tokio::test]
    async fn test_empty_input_yields_empty_map() {
        let translator = MockTranslator::new();
        let map = translate_texts(&translator, &[], "German", &fast_config())
            .await
            .unwrap();
        assert!(map.is_empty());
        assert_eq!(translator.calls.load(Ordering::SeqCst), 0);
    }
}

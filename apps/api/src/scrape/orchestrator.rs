//! Scrape orchestrator: drives one LinkedIn company scrape from submission to mapped profile.
//!
//! Every suspension point (submission, poll delay, status check, dataset fetch) is raced
//! against the caller's `CancellationToken` and a fixed deadline. A run abandoned after it
//! was started is aborted upstream on a best-effort basis.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::scrape::client::{ApifyTaskRunner, ScrapeConfig, TaskRunner};
use crate::scrape::error::{Result, ScrapeError};
use crate::scrape::mapping::map_raw_record;
use crate::scrape::types::{CompanyProfile, CompanyScraperInput, RunStatus};

const ABORT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ScrapeOrchestrator {
    runner: Arc<dyn TaskRunner>,
    poll_interval: Duration,
    timeout: Duration,
}

impl ScrapeOrchestrator {
    pub fn new(runner: Arc<dyn TaskRunner>, config: &ScrapeConfig) -> Self {
        Self {
            runner,
            poll_interval: config.poll_interval,
            timeout: config.timeout,
        }
    }

    /// Orchestrator backed by the Apify REST API.
    pub fn apify(config: &ScrapeConfig) -> Self {
        Self::new(Arc::new(ApifyTaskRunner::new(config)), config)
    }

    /// Scrapes one company profile URL.
    ///
    /// Returns `Ok(None)` when the run succeeds but yields no records.
    pub async fn fetch_company_profile(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<CompanyProfile>> {
        if url.trim().is_empty() {
            return Err(ScrapeError::InvalidInput(
                "company profile URL cannot be empty".to_string(),
            ));
        }

        let deadline = Instant::now() + self.timeout;
        info!(url, "Starting company profile scrape");

        let input = CompanyScraperInput::for_url(url);
        let run_id = guard(self.runner.start_run(&input), cancel, deadline, None).await?;
        info!(%run_id, "Apify run started, polling for completion");

        match self.collect(&run_id, cancel, deadline).await {
            Err(err @ (ScrapeError::TimedOut { .. } | ScrapeError::Cancelled { .. })) => {
                warn!(%run_id, error = %err, "Abandoning Apify run");
                self.abandon(&run_id).await;
                Err(err)
            }
            other => other,
        }
    }

    /// Same as `fetch_company_profile`, but runs on its own task under a child of `parent`.
    ///
    /// Dropping the returned future cancels the child token, so the spawned task aborts
    /// the external run instead of leaving it running unobserved.
    pub async fn fetch_detached(
        self: &Arc<Self>,
        url: String,
        parent: &CancellationToken,
    ) -> Result<Option<CompanyProfile>> {
        let cancel = parent.child_token();
        let _cancel_on_drop = cancel.clone().drop_guard();

        let this = Arc::clone(self);
        let handle =
            tokio::spawn(async move { this.fetch_company_profile(&url, &cancel).await });

        match handle.await {
            Ok(result) => result,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(_) => Err(ScrapeError::Cancelled { run_id: None }),
        }
    }

    async fn collect(
        &self,
        run_id: &str,
        cancel: &CancellationToken,
        deadline: Instant,
    ) -> Result<Option<CompanyProfile>> {
        let mut polls = 0u32;
        loop {
            guard(
                async {
                    tokio::time::sleep(self.poll_interval).await;
                    Ok(())
                },
                cancel,
                deadline,
                Some(run_id),
            )
            .await?;

            let status = guard(self.runner.run_status(run_id), cancel, deadline, Some(run_id)).await?;
            polls += 1;

            match status {
                RunStatus::Succeeded => {
                    info!(run_id, polls, "Run completed, fetching results");
                    break;
                }
                s if s.is_failure() => {
                    warn!(run_id, status = %s, "Apify run failed");
                    return Err(ScrapeError::UpstreamJobFailed(s));
                }
                s => debug!(run_id, status = %s, polls, "Run still in progress"),
            }
        }

        let items = guard(self.runner.run_items(run_id), cancel, deadline, Some(run_id)).await?;
        if items.is_empty() {
            info!(run_id, "Run returned no records");
        } else if items.len() > 1 {
            warn!(
                run_id,
                count = items.len(),
                "Run returned multiple records, keeping the first"
            );
        }

        Ok(map_raw_record(items.into_iter().next()))
    }

    async fn abandon(&self, run_id: &str) {
        match tokio::time::timeout(ABORT_TIMEOUT, self.runner.abort_run(run_id)).await {
            Ok(Ok(())) => info!(run_id, "Aborted abandoned Apify run"),
            Ok(Err(e)) => warn!(run_id, error = %e, "Failed to abort abandoned Apify run"),
            Err(_) => warn!(run_id, "Timed out aborting abandoned Apify run"),
        }
    }
}

/// Races `fut` against cancellation and the deadline.
async fn guard<T, F>(
    fut: F,
    cancel: &CancellationToken,
    deadline: Instant,
    run_id: Option<&str>,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ScrapeError::Cancelled {
            run_id: run_id.map(str::to_string),
        }),
        _ = tokio::time::sleep_until(deadline) => Err(ScrapeError::TimedOut {
            run_id: run_id.map(str::to_string),
        }),
        result = fut => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted task runner. Replays `statuses` in order and repeats the last one.
    #[derive(Default)]
    struct FakeRunner {
        statuses: Mutex<VecDeque<RunStatus>>,
        items: Vec<Value>,
        fail_start: bool,
        /// Status checks from this one onward (1-based) fail with `ServiceUnavailable`.
        fail_status_from: Option<usize>,
        started_inputs: Mutex<Vec<Vec<String>>>,
        poll_times: Mutex<Vec<Instant>>,
        item_calls: AtomicUsize,
        abort_calls: AtomicUsize,
    }

    impl FakeRunner {
        fn new(statuses: &[RunStatus], items: Vec<Value>) -> Arc<Self> {
            Arc::new(Self {
                statuses: Mutex::new(statuses.iter().copied().collect()),
                items,
                ..Self::default()
            })
        }

        fn polls(&self) -> Vec<Instant> {
            self.poll_times.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TaskRunner for FakeRunner {
        async fn start_run(&self, input: &CompanyScraperInput) -> Result<String> {
            if self.fail_start {
                return Err(ScrapeError::MalformedResponse("run id missing".to_string()));
            }
            self.started_inputs
                .lock()
                .unwrap()
                .push(input.company_profile_urls.clone());
            Ok("run-1".to_string())
        }

        async fn run_status(&self, _run_id: &str) -> Result<RunStatus> {
            let mut polls = self.poll_times.lock().unwrap();
            polls.push(Instant::now());
            if self.fail_status_from.is_some_and(|n| polls.len() >= n) {
                return Err(ScrapeError::ServiceUnavailable(
                    "Failed to check run status: Bad Gateway".to_string(),
                ));
            }
            drop(polls);
            let mut statuses = self.statuses.lock().unwrap();
            let status = if statuses.len() > 1 {
                statuses.pop_front()
            } else {
                statuses.front().copied()
            };
            Ok(status.unwrap_or(RunStatus::Running))
        }

        async fn run_items(&self, _run_id: &str) -> Result<Vec<Value>> {
            self.item_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.items.clone())
        }

        async fn abort_run(&self, _run_id: &str) -> Result<()> {
            self.abort_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn config(timeout_secs: u64) -> ScrapeConfig {
        ScrapeConfig {
            api_token: Some("test".to_string()),
            poll_interval: Duration::from_secs(5),
            timeout: Duration::from_secs(timeout_secs),
            ..ScrapeConfig::default()
        }
    }

    const ACME_URL: &str = "https://www.linkedin.com/company/acme";

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_succeeded_with_fixed_spacing() {
        let runner = FakeRunner::new(
            &[RunStatus::Pending, RunStatus::Running, RunStatus::Succeeded],
            vec![json!({"company_name": "Acme", "company_size": "10,001+ employees"})],
        );
        let orchestrator = ScrapeOrchestrator::new(runner.clone(), &config(300));

        let started = Instant::now();
        let profile = orchestrator
            .fetch_company_profile(ACME_URL, &CancellationToken::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(profile.name, "Acme");
        assert_eq!(profile.employee_count, Some(10001));

        let polls = runner.polls();
        assert_eq!(polls.len(), 3);
        assert!(polls[0] - started >= Duration::from_secs(5));
        for pair in polls.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(5));
        }
        assert_eq!(runner.item_calls.load(Ordering::SeqCst), 1);
        assert_eq!(runner.abort_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submits_url_as_actor_input() {
        let runner = FakeRunner::new(&[RunStatus::Succeeded], vec![]);
        let orchestrator = ScrapeOrchestrator::new(runner.clone(), &config(300));

        orchestrator
            .fetch_company_profile(ACME_URL, &CancellationToken::new())
            .await
            .unwrap();

        let inputs = runner.started_inputs.lock().unwrap().clone();
        assert_eq!(inputs, vec![vec![ACME_URL.to_string()]]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_acme_scenario_maps_first_record() {
        let runner = FakeRunner::new(
            &[RunStatus::Succeeded],
            vec![json!({"company_name": "Acme", "company_size": "51-200 employees"})],
        );
        let orchestrator = ScrapeOrchestrator::new(runner.clone(), &config(300));

        let profile = orchestrator
            .fetch_company_profile(ACME_URL, &CancellationToken::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(profile.name, "Acme");
        assert_eq!(profile.employee_count, Some(51));
        assert_eq!(profile.location, "");
        assert_eq!(runner.polls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_run_skips_result_retrieval() {
        let runner = FakeRunner::new(
            &[RunStatus::Running, RunStatus::Failed],
            vec![json!({"company_name": "Acme"})],
        );
        let orchestrator = ScrapeOrchestrator::new(runner.clone(), &config(300));

        let err = orchestrator
            .fetch_company_profile(ACME_URL, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ScrapeError::UpstreamJobFailed(RunStatus::Failed)
        ));
        assert_eq!(runner.item_calls.load(Ordering::SeqCst), 0);
        assert_eq!(runner.abort_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_aborted_run_is_upstream_failure() {
        let runner = FakeRunner::new(&[RunStatus::Aborted], vec![]);
        let orchestrator = ScrapeOrchestrator::new(runner.clone(), &config(300));

        let err = orchestrator
            .fetch_company_profile(ACME_URL, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::UpstreamJobFailed(RunStatus::Aborted)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_dataset_is_not_found() {
        let runner = FakeRunner::new(&[RunStatus::Succeeded], vec![]);
        let orchestrator = ScrapeOrchestrator::new(runner.clone(), &config(300));

        let result = orchestrator
            .fetch_company_profile(ACME_URL, &CancellationToken::new())
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(runner.item_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_extra_records_are_discarded() {
        let runner = FakeRunner::new(
            &[RunStatus::Succeeded],
            vec![
                json!({"company_name": "Acme Corp"}),
                json!({"company_name": "Acme Holdings"}),
            ],
        );
        let orchestrator = ScrapeOrchestrator::new(runner, &config(300));

        let profile = orchestrator
            .fetch_company_profile(ACME_URL, &CancellationToken::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.name, "Acme Corp");
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_url_is_rejected_without_submission() {
        let runner = FakeRunner::new(&[RunStatus::Succeeded], vec![]);
        let orchestrator = ScrapeOrchestrator::new(runner.clone(), &config(300));

        let err = orchestrator
            .fetch_company_profile("  ", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidInput(_)));
        assert!(runner.started_inputs.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_error_propagates() {
        let runner = Arc::new(FakeRunner {
            fail_start: true,
            ..FakeRunner::default()
        });
        let orchestrator = ScrapeOrchestrator::new(runner.clone(), &config(300));

        let err = orchestrator
            .fetch_company_profile(ACME_URL, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::MalformedResponse(_)));
        assert!(runner.polls().is_empty());
        assert_eq!(runner.abort_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_check_failure_stops_polling() {
        let runner = Arc::new(FakeRunner {
            statuses: Mutex::new(VecDeque::from([RunStatus::Running])),
            fail_status_from: Some(2),
            ..FakeRunner::default()
        });
        let orchestrator = ScrapeOrchestrator::new(runner.clone(), &config(300));

        let err = orchestrator
            .fetch_company_profile(ACME_URL, &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            ScrapeError::ServiceUnavailable(msg) => assert!(msg.contains("check run status")),
            other => panic!("expected ServiceUnavailable, got {other:?}"),
        }
        assert_eq!(runner.polls().len(), 2);
        assert_eq!(runner.item_calls.load(Ordering::SeqCst), 0);
        assert_eq!(runner.abort_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stuck_run_times_out_and_is_aborted() {
        let runner = FakeRunner::new(&[RunStatus::Running], vec![]);
        let orchestrator = ScrapeOrchestrator::new(runner.clone(), &config(60));

        let started = Instant::now();
        let err = orchestrator
            .fetch_company_profile(ACME_URL, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ScrapeError::TimedOut { run_id: Some(ref id) } if id == "run-1"
        ));
        assert!(Instant::now() - started >= Duration::from_secs(60));
        assert!(runner.polls().len() <= 12);
        assert_eq!(runner.abort_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_polling_and_aborts_run() {
        let runner = FakeRunner::new(&[RunStatus::Running], vec![]);
        let orchestrator = ScrapeOrchestrator::new(runner.clone(), &config(300));

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(12)).await;
            trigger.cancel();
        });

        let err = orchestrator
            .fetch_company_profile(ACME_URL, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, ScrapeError::Cancelled { run_id: Some(_) }));
        assert_eq!(runner.polls().len(), 2);
        assert_eq!(runner.abort_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_token_never_submits() {
        let runner = FakeRunner::new(&[RunStatus::Succeeded], vec![]);
        let orchestrator = ScrapeOrchestrator::new(runner.clone(), &config(300));

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = orchestrator
            .fetch_company_profile(ACME_URL, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, ScrapeError::Cancelled { run_id: None }));
        assert_eq!(runner.abort_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_detached_fetch_aborts_run() {
        let runner = FakeRunner::new(&[RunStatus::Running], vec![]);
        let orchestrator = Arc::new(ScrapeOrchestrator::new(runner.clone(), &config(300)));
        let shutdown = CancellationToken::new();

        let abandoned = tokio::time::timeout(
            Duration::from_secs(7),
            orchestrator.fetch_detached(ACME_URL.to_string(), &shutdown),
        )
        .await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(runner.abort_calls.load(Ordering::SeqCst), 1);
        assert!(!shutdown.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_detached_fetch() {
        let runner = FakeRunner::new(&[RunStatus::Running], vec![]);
        let orchestrator = Arc::new(ScrapeOrchestrator::new(runner.clone(), &config(300)));
        let shutdown = CancellationToken::new();

        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            trigger.cancel();
        });

        let err = orchestrator
            .fetch_detached(ACME_URL.to_string(), &shutdown)
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Cancelled { .. }));
        assert_eq!(runner.abort_calls.load(Ordering::SeqCst), 1);
    }
}

//! Waiting on server-side index state changes.
//!
//! The server has no way to notify a client when an index becomes visible,
//! disappears, or finishes merging, so the client polls. Every wait runs the
//! same loop in [`await_condition`]; what differs is how a [`Condition`]
//! reads each status query.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, Instant};

use crate::error::{AvsError, Result};

/// Deadline and pacing of one wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollConfig {
    /// Measured from the start of the wait. `Duration::MAX` waits forever.
    pub timeout: Duration,
    /// Pause between status queries. Zero polls back to back.
    pub interval: Duration,
}

impl PollConfig {
    pub const CREATE_DELETE_INTERVAL: Duration = Duration::from_millis(100);
    pub const MERGE_INTERVAL: Duration = Duration::from_secs(10);

    /// Pacing for index creation and deletion.
    pub fn create_delete() -> Self {
        Self {
            timeout: Duration::MAX,
            interval: Self::CREATE_DELETE_INTERVAL,
        }
    }

    /// Pacing for merge completion.
    pub fn merge() -> Self {
        Self {
            timeout: Duration::MAX,
            interval: Self::MERGE_INTERVAL,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::create_delete()
    }
}

/// How one status query was read.
#[derive(Debug)]
pub enum PollOutcome {
    Ready,
    NotYetReady,
    /// A whitelisted error; keep waiting.
    TransientFailure(AvsError),
}

impl fmt::Display for PollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollOutcome::Ready => f.write_str("ready"),
            PollOutcome::NotYetReady => f.write_str("not ready"),
            PollOutcome::TransientFailure(err) => write!(f, "transient failure: {err}"),
        }
    }
}

/// Whether a first `Ready` must be confirmed by the next observation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Debounce {
    None,
    Confirm,
}

/// Interprets status query results for one kind of wait.
pub trait Condition<T> {
    /// Returns `Err` for errors that must end the wait.
    fn classify(&self, result: Result<T>) -> Result<PollOutcome>;

    fn debounce(&self) -> Debounce {
        Debounce::None
    }

    /// Short label used in log events.
    fn describe(&self) -> &'static str;
}

/// The index status is published: any successful status query completes.
#[derive(Clone, Copy, Debug, Default)]
pub struct IndexCreated;

impl<T> Condition<T> for IndexCreated {
    fn classify(&self, result: Result<T>) -> Result<PollOutcome> {
        match result {
            Ok(_) => Ok(PollOutcome::Ready),
            Err(err @ (AvsError::Unavailable(_) | AvsError::NotFound(_))) => {
                Ok(PollOutcome::TransientFailure(err))
            }
            Err(err) => Err(err),
        }
    }

    fn describe(&self) -> &'static str {
        "index creation"
    }
}

/// The index status is gone: the same transient set as [`IndexCreated`] now
/// signals completion, and a successful query means the index still exists.
#[derive(Clone, Copy, Debug, Default)]
pub struct IndexDeleted;

impl<T> Condition<T> for IndexDeleted {
    fn classify(&self, result: Result<T>) -> Result<PollOutcome> {
        match result {
            Ok(_) => Ok(PollOutcome::NotYetReady),
            Err(AvsError::Unavailable(_) | AvsError::NotFound(_)) => Ok(PollOutcome::Ready),
            Err(err) => Err(err),
        }
    }

    fn describe(&self) -> &'static str {
        "index deletion"
    }
}

/// No records are waiting to be merged, observed twice in a row.
///
/// The unmerged count can read zero for one cycle while the next batch is
/// still being queued on the server.
#[derive(Clone, Copy, Debug, Default)]
pub struct IndexMerged;

impl Condition<i64> for IndexMerged {
    fn classify(&self, result: Result<i64>) -> Result<PollOutcome> {
        match result {
            Ok(0) => Ok(PollOutcome::Ready),
            Ok(_) => Ok(PollOutcome::NotYetReady),
            Err(err @ AvsError::Unavailable(_)) => Ok(PollOutcome::TransientFailure(err)),
            Err(err) => Err(err),
        }
    }

    fn debounce(&self) -> Debounce {
        Debounce::Confirm
    }

    fn describe(&self) -> &'static str {
        "index merge"
    }
}

/// What the loop does after an observation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Done,
    Continue,
}

/// Loop-local state of one wait.
#[derive(Debug)]
pub struct PollState {
    started: Instant,
    last_outcome: Option<PollOutcome>,
    debounce_armed: bool,
    attempts: u32,
}

impl PollState {
    pub fn new(started: Instant) -> Self {
        Self {
            started,
            last_outcome: None,
            debounce_armed: false,
            attempts: 0,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn last_outcome(&self) -> Option<&PollOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn debounce_armed(&self) -> bool {
        self.debounce_armed
    }

    /// Fails once `timeout` has elapsed since the wait started.
    pub fn check_deadline(&self, now: Instant, timeout: Duration) -> Result<()> {
        if now.saturating_duration_since(self.started) >= timeout {
            return Err(AvsError::Timeout(timeout));
        }
        Ok(())
    }

    /// Record one observation. Anything other than `Ready` disarms the
    /// debounce.
    pub fn observe(&mut self, outcome: PollOutcome, debounce: Debounce) -> Step {
        self.attempts = self.attempts.saturating_add(1);
        let step = match (&outcome, debounce) {
            (PollOutcome::Ready, Debounce::None) => Step::Done,
            (PollOutcome::Ready, Debounce::Confirm) if self.debounce_armed => Step::Done,
            (PollOutcome::Ready, Debounce::Confirm) => {
                self.debounce_armed = true;
                Step::Continue
            }
            (PollOutcome::NotYetReady | PollOutcome::TransientFailure(_), _) => {
                self.debounce_armed = false;
                Step::Continue
            }
        };
        self.last_outcome = Some(outcome);
        step
    }

    /// Pause before the next query, clamped so the loop wakes no later than
    /// the deadline.
    pub fn next_sleep(&self, now: Instant, config: &PollConfig) -> Duration {
        let elapsed = now.saturating_duration_since(self.started);
        config.interval.min(config.timeout.saturating_sub(elapsed))
    }
}

/// Poll `query` until `condition` reports completion.
///
/// Cancellation is checked before every query and raced against every sleep;
/// a query already in flight runs to completion. Errors the condition does
/// not whitelist end the wait immediately.
pub async fn await_condition<T, Q, Fut, C>(
    mut query: Q,
    condition: &C,
    config: PollConfig,
    mut cancel: Option<watch::Receiver<bool>>,
) -> Result<()>
where
    Q: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    C: Condition<T> + ?Sized,
{
    let what = condition.describe();
    let mut state = PollState::new(Instant::now());

    loop {
        if is_cancelled(cancel.as_ref()) {
            tracing::debug!(target: "avs_rs::poll", what, attempts = state.attempts(), "Wait cancelled");
            return Err(AvsError::Cancelled);
        }
        if let Err(err) = state.check_deadline(Instant::now(), config.timeout) {
            tracing::warn!(
                target: "avs_rs::poll",
                what,
                attempts = state.attempts(),
                last = %state.last_outcome().map(ToString::to_string).unwrap_or_default(),
                "Wait timed out"
            );
            return Err(err);
        }

        let outcome = match condition.classify(query().await) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(target: "avs_rs::poll", what, attempt = state.attempts().saturating_add(1), error = %err, "Wait aborted");
                return Err(err);
            }
        };
        tracing::debug!(target: "avs_rs::poll", what, attempt = state.attempts().saturating_add(1), %outcome, "Polled");

        if state.observe(outcome, condition.debounce()) == Step::Done {
            tracing::debug!(target: "avs_rs::poll", what, attempts = state.attempts(), "Wait complete");
            return Ok(());
        }

        let pause = state.next_sleep(Instant::now(), &config);
        if !pause.is_zero() {
            sleep_or_cancel(pause, cancel.as_mut()).await?;
        }
    }
}

fn is_cancelled(cancel: Option<&watch::Receiver<bool>>) -> bool {
    cancel.is_some_and(|rx| *rx.borrow())
}

async fn sleep_or_cancel(
    duration: Duration,
    cancel: Option<&mut watch::Receiver<bool>>,
) -> Result<()> {
    let Some(rx) = cancel else {
        time::sleep(duration).await;
        return Ok(());
    };

    let sleep = time::sleep(duration);
    tokio::pin!(sleep);
    loop {
        tokio::select! {
            _ = &mut sleep => return Ok(()),
            changed = rx.changed() => {
                // Sender gone: nobody can cancel any more.
                if changed.is_err() {
                    break;
                }
                if *rx.borrow() {
                    return Err(AvsError::Cancelled);
                }
            }
        }
    }
    sleep.await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn not_found() -> AvsError {
        AvsError::NotFound("index status not published".into())
    }

    fn unavailable() -> AvsError {
        AvsError::Unavailable("node down".into())
    }

    /// A query whose n-th call (0-based) returns `script(n)`.
    fn scripted<T, F>(
        calls: &Arc<AtomicUsize>,
        script: F,
    ) -> impl FnMut() -> std::future::Ready<Result<T>>
    where
        F: Fn(usize) -> Result<T>,
    {
        let calls = Arc::clone(calls);
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(script(n))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn creation_with_zero_interval_does_not_sleep() {
        let calls = Arc::new(AtomicUsize::new(0));
        let query = scripted(&calls, |n| if n < 2 { Err(not_found()) } else { Ok(0_i64) });
        let config = PollConfig::create_delete().with_interval(Duration::ZERO);

        let start = Instant::now();
        await_condition(query, &IndexCreated, config, None).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn creation_succeeds_on_first_published_status() {
        for k in [0_usize, 1, 4] {
            let calls = Arc::new(AtomicUsize::new(0));
            let query = scripted(&calls, move |n| {
                if n < k {
                    Err(if n % 2 == 0 { not_found() } else { unavailable() })
                } else {
                    Ok(0_i64)
                }
            });

            await_condition(query, &IndexCreated, PollConfig::create_delete(), None)
                .await
                .unwrap();
            assert_eq!(calls.load(Ordering::SeqCst), k + 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn deletion_waits_while_status_is_served() {
        let k = 3;
        let calls = Arc::new(AtomicUsize::new(0));
        let query = scripted(&calls, move |n| if n < k { Ok(7_i64) } else { Err(not_found()) });

        await_condition(query, &IndexDeleted, PollConfig::create_delete(), None)
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), k + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn merge_requires_two_consecutive_zero_counts() {
        let counts = [5_i64, 0, 3, 0, 0];
        let calls = Arc::new(AtomicUsize::new(0));
        let query = scripted(&calls, move |n| Ok(counts[n.min(counts.len() - 1)]));

        let start = Instant::now();
        await_condition(query, &IndexMerged, PollConfig::merge(), None)
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 5);
        let elapsed = start.elapsed();
        assert!(elapsed >= PollConfig::MERGE_INTERVAL * 4);
        assert!(elapsed < PollConfig::MERGE_INTERVAL * 5);
    }

    #[tokio::test(start_paused = true)]
    async fn merge_zero_then_unavailable_times_out() {
        let calls = Arc::new(AtomicUsize::new(0));
        let query = scripted(&calls, |n| if n == 0 { Ok(0_i64) } else { Err(unavailable()) });
        let timeout = Duration::from_secs(60);
        let config = PollConfig::merge().with_timeout(timeout);

        let start = Instant::now();
        let err = await_condition(query, &IndexMerged, config, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AvsError::Timeout(t) if t == timeout));
        let elapsed = start.elapsed();
        assert!(elapsed >= timeout && elapsed < timeout + config.interval);
        assert!(calls.load(Ordering::SeqCst) > 1);
    }

    #[tokio::test(start_paused = true)]
    async fn merge_recovers_after_unavailable_between_zero_counts() {
        let calls = Arc::new(AtomicUsize::new(0));
        let query = scripted(&calls, |n| match n {
            1 => Err(unavailable()),
            _ => Ok(0_i64),
        });

        let start = Instant::now();
        await_condition(query, &IndexMerged, PollConfig::merge(), None)
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        let elapsed = start.elapsed();
        assert!(elapsed >= PollConfig::MERGE_INTERVAL * 3);
        assert!(elapsed < PollConfig::MERGE_INTERVAL * 4);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_timeout_fails_without_querying() {
        let calls = Arc::new(AtomicUsize::new(0));
        let query = scripted(&calls, |_| Ok(0_i64));
        let config = PollConfig::create_delete().with_timeout(Duration::ZERO);

        let err = await_condition(query, &IndexCreated, config, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AvsError::Timeout(t) if t.is_zero()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn never_ready_times_out_within_one_interval_of_deadline() {
        let cases = [
            (Duration::from_secs(1), Duration::from_millis(300)),
            (Duration::from_secs(1), Duration::from_millis(100)),
            (Duration::from_millis(250), Duration::from_millis(249)),
            (Duration::from_secs(30), Duration::from_secs(7)),
        ];
        for (timeout, interval) in cases {
            let calls = Arc::new(AtomicUsize::new(0));
            let query = scripted(&calls, |_| Ok(42_i64));
            let config = PollConfig::merge()
                .with_timeout(timeout)
                .with_interval(interval);

            let start = Instant::now();
            let err = await_condition(query, &IndexMerged, config, None)
                .await
                .unwrap_err();

            assert!(matches!(err, AvsError::Timeout(_)));
            let elapsed = start.elapsed();
            assert!(
                elapsed >= timeout && elapsed < timeout + interval,
                "timeout {timeout:?} interval {interval:?} elapsed {elapsed:?}"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_error_stops_polling_immediately() {
        let calls = Arc::new(AtomicUsize::new(0));
        let query = scripted(&calls, |n| {
            if n < 2 {
                Err::<i64, _>(not_found())
            } else {
                Err(AvsError::Server {
                    code: tonic::Code::PermissionDenied,
                    message: "denied".into(),
                })
            }
        });

        let err = await_condition(query, &IndexCreated, PollConfig::create_delete(), None)
            .await
            .unwrap_err();

        assert_eq!(err.code(), Some(tonic::Code::PermissionDenied));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn merge_treats_not_found_as_fatal() {
        let calls = Arc::new(AtomicUsize::new(0));
        let query = scripted(&calls, |_| Err::<i64, _>(not_found()));

        let err = await_condition(query, &IndexMerged, PollConfig::merge(), None)
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn deletion_propagates_other_errors() {
        let calls = Arc::new(AtomicUsize::new(0));
        let query = scripted(&calls, |_| {
            Err::<i64, _>(AvsError::Server {
                code: tonic::Code::Internal,
                message: "boom".into(),
            })
        });

        let err = await_condition(query, &IndexDeleted, PollConfig::create_delete(), None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(tonic::Code::Internal));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_before_start_issues_no_query() {
        let (_tx, rx) = watch::channel(true);
        let calls = Arc::new(AtomicUsize::new(0));
        let query = scripted(&calls, |_| Ok(0_i64));

        let err = await_condition(query, &IndexCreated, PollConfig::create_delete(), Some(rx))
            .await
            .unwrap_err();

        assert!(matches!(err, AvsError::Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_sleep() {
        let (tx, rx) = watch::channel(false);
        let calls = Arc::new(AtomicUsize::new(0));
        let query = scripted(&calls, |_| Ok(3_i64));

        tokio::spawn(async move {
            time::sleep(Duration::from_millis(50)).await;
            let _ = tx.send(true);
        });

        let start = Instant::now();
        let err = await_condition(query, &IndexMerged, PollConfig::merge(), Some(rx))
            .await
            .unwrap_err();

        assert!(matches!(err, AvsError::Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(start.elapsed() < PollConfig::MERGE_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_cancel_sender_does_not_spin() {
        let (tx, rx) = watch::channel(false);
        drop(tx);
        let calls = Arc::new(AtomicUsize::new(0));
        let query = scripted(&calls, |n| Ok(if n < 2 { 1_i64 } else { 0 }));

        let start = Instant::now();
        await_condition(query, &IndexMerged, PollConfig::merge(), Some(rx))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        let elapsed = start.elapsed();
        assert!(elapsed >= PollConfig::MERGE_INTERVAL * 3);
        assert!(elapsed < PollConfig::MERGE_INTERVAL * 4);
    }

    #[test]
    fn non_ready_observation_disarms_debounce() {
        let mut state = PollState::new(Instant::now());
        assert_eq!(state.observe(PollOutcome::Ready, Debounce::Confirm), Step::Continue);
        assert!(state.debounce_armed());
        assert_eq!(
            state.observe(PollOutcome::TransientFailure(unavailable()), Debounce::Confirm),
            Step::Continue
        );
        assert!(!state.debounce_armed());
        assert_eq!(state.observe(PollOutcome::Ready, Debounce::Confirm), Step::Continue);
        assert_eq!(state.observe(PollOutcome::Ready, Debounce::Confirm), Step::Done);
        assert_eq!(state.attempts(), 4);
    }

    #[test]
    fn attempt_counter_saturates() {
        let mut state = PollState::new(Instant::now());
        state.attempts = u32::MAX - 1;
        assert_eq!(state.observe(PollOutcome::NotYetReady, Debounce::None), Step::Continue);
        assert_eq!(state.observe(PollOutcome::NotYetReady, Debounce::None), Step::Continue);
        assert_eq!(state.attempts(), u32::MAX);
        assert_eq!(state.observe(PollOutcome::Ready, Debounce::None), Step::Done);
        assert_eq!(state.attempts(), u32::MAX);
    }

    #[test]
    fn sleep_is_clamped_to_remaining_budget() {
        let start = Instant::now();
        let state = PollState::new(start);
        let config = PollConfig::merge().with_timeout(Duration::from_secs(25));

        assert_eq!(state.next_sleep(start, &config), Duration::from_secs(10));
        assert_eq!(
            state.next_sleep(start + Duration::from_secs(20), &config),
            Duration::from_secs(5)
        );
        assert_eq!(
            state.next_sleep(start + Duration::from_secs(30), &config),
            Duration::ZERO
        );
    }

    #[test]
    fn unbounded_timeout_never_expires() {
        let start = Instant::now();
        let state = PollState::new(start);
        assert!(
            state
                .check_deadline(start + Duration::from_secs(86_400 * 365), Duration::MAX)
                .is_ok()
        );
    }
}

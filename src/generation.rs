//! Generation orchestrator — chart-data then visual-chart, once per session.
//!
//! The one-shot guard is an explicit state machine rather than a boolean
//! flag: only `Idle` accepts a trigger, and only `Failed` accepts a manual
//! re-arm, so double-triggered generation (auto-trigger racing a manual
//! confirmation) cannot start twice.

use std::sync::Arc;

use rand::Rng;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::api::AstroApi;
use crate::config::PacingConfig;
use crate::dialog::{DialogStep, prompts};
use crate::session::Session;

/// Lifecycle of chart generation within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationState {
    /// No generation has been requested yet.
    Idle,
    /// A generation run holds the latch.
    InFlight,
    /// The chart was produced; no further runs this session.
    Done,
    /// The last run failed; an explicit re-confirmation may re-arm.
    Failed,
}

impl GenerationState {
    /// Take the latch for a fresh trigger. Only `Idle` succeeds.
    pub fn try_begin(&mut self) -> bool {
        if *self == Self::Idle {
            *self = Self::InFlight;
            true
        } else {
            false
        }
    }

    /// Take the latch for a manual retry. Only `Failed` succeeds.
    pub fn try_rearm(&mut self) -> bool {
        if *self == Self::Failed {
            *self = Self::InFlight;
            true
        } else {
            false
        }
    }
}

impl Default for GenerationState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Run one generation attempt for the session.
///
/// Returns immediately without side effects when the latch refuses the
/// trigger. On success the transcript gains exactly one chart message and
/// the step advances to `ChartGenerated`; the reveal never happens before
/// the randomized minimum floor has elapsed, however fast the backend was.
pub async fn run(
    api: Arc<dyn AstroApi>,
    session: Arc<Mutex<Session>>,
    pacing: PacingConfig,
    rearm: bool,
) {
    let (profile, epoch) = {
        let mut s = session.lock().await;
        let latched = if rearm {
            s.generation.try_rearm()
        } else {
            s.generation.try_begin()
        };
        if !latched {
            tracing::debug!(state = ?s.generation, "Generation trigger refused by latch");
            return;
        }
        (s.profile.clone(), s.epoch())
    };

    let started = Instant::now();
    let (floor_min, floor_max) = pacing.chart_floor_ms;
    let min_delay = Duration::from_millis(rand::thread_rng().gen_range(floor_min..=floor_max));

    tracing::info!(name = %profile.name, "Generating chart data");
    let chart_data = match api.kundli(&profile).await {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "Chart-data generation failed");
            fail(&session, epoch).await;
            return;
        }
    };

    {
        let mut s = session.lock().await;
        if s.epoch() != epoch {
            return; // Refreshed while the request was in flight.
        }
        s.chart_data = Some(chart_data);
        s.announce_typing();
        s.say(prompts::chart_data_ready());
    }

    let visual = match api.chart(&profile).await {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "Visual-chart generation failed");
            fail(&session, epoch).await;
            return;
        }
    };

    // Hold the reveal until the minimum "working" duration has passed.
    let remaining = min_delay.saturating_sub(started.elapsed());
    {
        let s = session.lock().await;
        if s.epoch() != epoch {
            return;
        }
        s.announce_typing();
    }
    tokio::time::sleep(remaining).await;

    let mut s = session.lock().await;
    if s.epoch() != epoch {
        return;
    }
    s.visual_chart = Some(visual.clone());
    s.reveal_chart(visual);
    s.set_step(DialogStep::ChartGenerated);
    s.say(prompts::chart_revealed());
    s.generation = GenerationState::Done;
    tracing::info!("Chart revealed");
}

async fn fail(session: &Arc<Mutex<Session>>, epoch: u64) {
    let mut s = session.lock().await;
    if s.epoch() != epoch {
        return; // Refreshed while the request was in flight.
    }
    s.generation = GenerationState::Failed;
    s.announce_typing();
    s.say(prompts::generation_failed());
    // The step intentionally stays at Generating; a confirmation re-arms.
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::Value;

    use crate::api::HealthStatus;
    use crate::error::ApiError;
    use crate::profile::BirthProfile;
    use crate::session::SessionEvent;

    use super::*;

    #[derive(Default)]
    struct MockApi {
        kundli_calls: AtomicUsize,
        chart_calls: AtomicUsize,
        fail_kundli: bool,
        fail_chart: bool,
        kundli_delay_ms: u64,
    }

    #[async_trait]
    impl AstroApi for MockApi {
        async fn chat(&self, _message: &str, _chart: Option<&Value>) -> Result<String, ApiError> {
            Ok("stub reply".to_string())
        }

        async fn kundli(&self, _profile: &BirthProfile) -> Result<Value, ApiError> {
            self.kundli_calls.fetch_add(1, Ordering::SeqCst);
            if self.kundli_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.kundli_delay_ms)).await;
            }
            if self.fail_kundli {
                Err(ApiError::Backend {
                    endpoint: "/api/kundli".to_string(),
                    message: "down".to_string(),
                })
            } else {
                Ok(serde_json::json!({"ascendant_sign": 3, "planets": {}}))
            }
        }

        async fn chart(&self, _profile: &BirthProfile) -> Result<Value, ApiError> {
            self.chart_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_chart {
                Err(ApiError::Backend {
                    endpoint: "/api/chart".to_string(),
                    message: "down".to_string(),
                })
            } else {
                Ok(serde_json::json!({"svg_content": "<svg/>", "format": "svg"}))
            }
        }

        async fn submit_form(&self, _profile: &BirthProfile) {}

        async fn health(&self) -> Result<HealthStatus, ApiError> {
            unimplemented!("not used in generation tests")
        }
    }

    fn complete_profile() -> BirthProfile {
        BirthProfile {
            name: "Rajesh".to_string(),
            dob: "1990-05-15".to_string(),
            tob: "14:30:00".to_string(),
            place: "Delhi".to_string(),
            timezone: "Asia/Kolkata".to_string(),
        }
    }

    fn session_with_profile() -> (
        Arc<Mutex<Session>>,
        tokio::sync::mpsc::UnboundedReceiver<SessionEvent>,
    ) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let session = Session::resume_with(complete_profile(), tx);
        (Arc::new(Mutex::new(session)), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn successful_run_reveals_exactly_one_chart() {
        let api = Arc::new(MockApi::default());
        let (session, _rx) = session_with_profile();

        run(api.clone(), Arc::clone(&session), PacingConfig::default(), false).await;

        let s = session.lock().await;
        assert_eq!(api.kundli_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.chart_calls.load(Ordering::SeqCst), 1);
        assert!(s.transcript.has_chart());
        assert_eq!(s.step, DialogStep::ChartGenerated);
        assert_eq!(s.generation, GenerationState::Done);
        assert!(s.chart_data.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn double_trigger_generates_once() {
        let api = Arc::new(MockApi::default());
        let (session, _rx) = session_with_profile();

        run(api.clone(), Arc::clone(&session), PacingConfig::default(), false).await;
        run(api.clone(), Arc::clone(&session), PacingConfig::default(), false).await;

        let s = session.lock().await;
        assert_eq!(api.kundli_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.chart_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            s.transcript.messages().iter().filter(|m| m.is_chart()).count(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_triggers_generate_once() {
        let api = Arc::new(MockApi::default());
        let (session, _rx) = session_with_profile();

        // Auto-trigger from a pre-filled profile racing a manual confirm.
        let a = tokio::spawn(run(
            api.clone(),
            Arc::clone(&session),
            PacingConfig::default(),
            false,
        ));
        let b = tokio::spawn(run(
            api.clone(),
            Arc::clone(&session),
            PacingConfig::default(),
            false,
        ));
        a.await.unwrap();
        b.await.unwrap();

        assert_eq!(api.kundli_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.chart_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn chart_not_revealed_before_minimum_floor() {
        let api = Arc::new(MockApi::default());
        let (session, _rx) = session_with_profile();

        let started = Instant::now();
        run(api, Arc::clone(&session), PacingConfig::default(), false).await;
        let elapsed = started.elapsed();

        // The mock backend answers instantly, yet the floor still applies.
        assert!(
            elapsed >= Duration::from_millis(8000),
            "chart revealed after only {elapsed:?}"
        );
        assert!(session.lock().await.transcript.has_chart());
    }

    #[tokio::test(start_paused = true)]
    async fn kundli_failure_marks_failed_and_skips_chart() {
        let api = Arc::new(MockApi {
            fail_kundli: true,
            ..Default::default()
        });
        let (session, _rx) = session_with_profile();

        run(api.clone(), Arc::clone(&session), PacingConfig::default(), false).await;

        let s = session.lock().await;
        assert_eq!(s.generation, GenerationState::Failed);
        assert_eq!(s.step, DialogStep::Generating);
        assert_eq!(api.chart_calls.load(Ordering::SeqCst), 0);
        assert!(!s.transcript.has_chart());
        // One apologetic message, no retry scheduled.
        assert_eq!(api.kundli_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn visual_failure_marks_failed() {
        let api = Arc::new(MockApi {
            fail_chart: true,
            ..Default::default()
        });
        let (session, _rx) = session_with_profile();

        run(api.clone(), Arc::clone(&session), PacingConfig::default(), false).await;

        let s = session.lock().await;
        assert_eq!(s.generation, GenerationState::Failed);
        assert!(!s.transcript.has_chart());
        // Chart-data succeeded and is retained for chat context.
        assert!(s.chart_data.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn rearm_after_failure_runs_again() {
        let (session, _rx) = session_with_profile();

        let failing = Arc::new(MockApi {
            fail_kundli: true,
            ..Default::default()
        });
        run(failing, Arc::clone(&session), PacingConfig::default(), false).await;
        assert_eq!(session.lock().await.generation, GenerationState::Failed);

        // A plain trigger is still refused; only a re-arm goes through.
        let healthy = Arc::new(MockApi::default());
        run(healthy.clone(), Arc::clone(&session), PacingConfig::default(), false).await;
        assert_eq!(healthy.kundli_calls.load(Ordering::SeqCst), 0);

        run(healthy.clone(), Arc::clone(&session), PacingConfig::default(), true).await;
        let s = session.lock().await;
        assert_eq!(healthy.kundli_calls.load(Ordering::SeqCst), 1);
        assert_eq!(s.generation, GenerationState::Done);
        assert!(s.transcript.has_chart());
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_resets_latch_for_a_new_attempt() {
        let api = Arc::new(MockApi::default());
        let (session, _rx) = session_with_profile();

        run(api.clone(), Arc::clone(&session), PacingConfig::default(), false).await;
        assert_eq!(api.kundli_calls.load(Ordering::SeqCst), 1);

        {
            let mut s = session.lock().await;
            s.refresh();
            assert_eq!(s.generation, GenerationState::Idle);
            s.profile = complete_profile();
        }

        run(api.clone(), Arc::clone(&session), PacingConfig::default(), false).await;
        run(api.clone(), Arc::clone(&session), PacingConfig::default(), false).await;
        assert_eq!(api.kundli_calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            session
                .lock()
                .await
                .transcript
                .messages()
                .iter()
                .filter(|m| m.is_chart())
                .count(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_mid_flight_discards_the_stale_run() {
        let api = Arc::new(MockApi {
            kundli_delay_ms: 10_000,
            ..Default::default()
        });
        let (session, _rx) = session_with_profile();

        let task = tokio::spawn(run(
            api.clone(),
            Arc::clone(&session),
            PacingConfig::default(),
            false,
        ));
        // Let the run take the latch and enter its backend call.
        tokio::task::yield_now().await;
        assert_eq!(session.lock().await.generation, GenerationState::InFlight);

        {
            let mut s = session.lock().await;
            s.refresh();
        }
        task.await.unwrap();

        // The stale run applied nothing after the refresh.
        let mut s = session.lock().await;
        assert_eq!(s.generation, GenerationState::Idle);
        assert!(s.transcript.is_empty());
        assert!(!s.transcript.has_chart());

        // A new complete-profile session generates again, exactly once.
        s.profile = complete_profile();
        drop(s);
        let healthy = Arc::new(MockApi::default());
        run(healthy.clone(), Arc::clone(&session), PacingConfig::default(), false).await;
        assert_eq!(healthy.kundli_calls.load(Ordering::SeqCst), 1);
        assert!(session.lock().await.transcript.has_chart());
    }

    #[test]
    fn latch_transitions() {
        let mut state = GenerationState::Idle;
        assert!(state.try_begin());
        assert_eq!(state, GenerationState::InFlight);
        assert!(!state.try_begin());
        assert!(!state.try_rearm());

        let mut state = GenerationState::Failed;
        assert!(!state.try_begin());
        assert!(state.try_rearm());
        assert_eq!(state, GenerationState::InFlight);

        let mut state = GenerationState::Done;
        assert!(!state.try_begin());
        assert!(!state.try_rearm());
    }
}

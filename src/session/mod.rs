//! Per-session state and the driver that paces replies and runs actions.
//!
//! Each browser widget session owns all of its mutable state — profile,
//! transcript, dialog step, generation latch, pending debounce timer —
//! inside one [`Session`] aggregate behind one lock, so there is nothing
//! shared across sessions and refresh is atomic from the caller's point of
//! view.

pub mod transcript;

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::api::AstroApi;
use crate::config::PacingConfig;
use crate::dialog::{DialogStep, TurnAction, controller, prompts};
use crate::error::SessionError;
use crate::generation::{self, GenerationState};
use crate::profile::BirthProfile;
use crate::remedies;
use crate::topics::{self, TopicContext};
use crate::typing;

pub use transcript::{Message, MessageKind, Sender, Transcript};

/// Event pushed to the connected widget client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Typing placeholder shown or removed.
    Typing { active: bool },
    /// A transcript message was appended.
    Message { message: Message },
    /// The dialog step changed.
    Step { step: DialogStep },
    /// The session was refreshed; the client should clear its transcript.
    Cleared,
}

/// All mutable state for one widget session.
pub struct Session {
    pub id: Uuid,
    pub profile: BirthProfile,
    pub step: DialogStep,
    pub transcript: Transcript,
    pub generation: GenerationState,
    /// Raw chart-data payload from `/api/kundli` (preferred chat context).
    pub chart_data: Option<serde_json::Value>,
    /// Renderable payload from `/api/chart`.
    pub visual_chart: Option<serde_json::Value>,
    pub topic_ctx: TopicContext,
    /// Bumped on refresh; stale in-flight work checks it before applying.
    epoch: u64,
    pending_trigger: Option<JoinHandle<()>>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl Session {
    /// A fresh session starting at `AskName`.
    pub fn new(events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self {
            id: Uuid::new_v4(),
            profile: BirthProfile::default(),
            step: DialogStep::AskName,
            transcript: Transcript::new(),
            generation: GenerationState::Idle,
            chart_data: None,
            visual_chart: None,
            topic_ctx: TopicContext::default(),
            epoch: 0,
            pending_trigger: None,
            events,
        }
    }

    /// Resume a session with a previously collected (possibly partial)
    /// profile: complete skips straight to `Generating`; a known name
    /// resumes at `AskDob`; anything else starts over.
    pub fn resume_with(
        profile: BirthProfile,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        let step = if profile.is_complete() {
            DialogStep::Generating
        } else if !profile.name.trim().is_empty() {
            DialogStep::AskDob
        } else {
            DialogStep::AskName
        };
        Self {
            profile,
            step,
            ..Self::new(events)
        }
    }

    pub fn emit(&self, event: SessionEvent) {
        // A closed receiver just means no client is attached.
        let _ = self.events.send(event);
    }

    /// Show the typing placeholder.
    pub fn announce_typing(&self) {
        self.emit(SessionEvent::Typing { active: true });
    }

    /// Replace the typing placeholder with an assistant message.
    pub fn say(&mut self, text: impl Into<String>) {
        self.emit(SessionEvent::Typing { active: false });
        let message = self.transcript.push_assistant(text);
        self.emit(SessionEvent::Message { message });
    }

    /// Record a user message and notify the client.
    pub fn record_user(&mut self, text: &str) {
        let message = self.transcript.push_user(text);
        self.emit(SessionEvent::Message { message });
    }

    /// Append the chart message (duplicate-guarded) and notify the client.
    pub fn reveal_chart(&mut self, chart: serde_json::Value) -> bool {
        self.emit(SessionEvent::Typing { active: false });
        match self.transcript.push_chart(chart) {
            Some(message) => {
                self.emit(SessionEvent::Message { message });
                true
            }
            None => false,
        }
    }

    pub fn set_step(&mut self, step: DialogStep) {
        if self.step != step {
            self.step = step;
            self.emit(SessionEvent::Step { step });
        }
    }

    /// Chat context for the completion endpoint: prefer the raw chart-data
    /// payload over the visual payload when both exist.
    pub fn chart_context(&self) -> Option<&serde_json::Value> {
        self.chart_data.as_ref().or(self.visual_chart.as_ref())
    }

    /// Current refresh epoch; in-flight tasks compare against it.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Replace any pending auto-trigger timer, cancelling the old one.
    pub fn set_pending_trigger(&mut self, handle: JoinHandle<()>) {
        if let Some(old) = self.pending_trigger.replace(handle) {
            old.abort();
        }
    }

    /// Reset everything: transcript, profile, step, generation latch, and
    /// any pending timer. The sole reset boundary for a session.
    pub fn refresh(&mut self) {
        if let Some(timer) = self.pending_trigger.take() {
            timer.abort();
        }
        self.profile = BirthProfile::default();
        self.step = DialogStep::AskName;
        self.transcript.clear();
        self.generation = GenerationState::Idle;
        self.chart_data = None;
        self.visual_chart = None;
        self.topic_ctx = TopicContext::default();
        self.epoch += 1;
        self.emit(SessionEvent::Cleared);
    }
}

/// Driver for one session: paces replies, executes controller actions.
pub struct SessionHandle {
    pub id: Uuid,
    session: Arc<Mutex<Session>>,
    api: Arc<dyn AstroApi>,
    pacing: PacingConfig,
}

impl SessionHandle {
    /// Create a fresh session; returns the handle and the event stream for
    /// the connected client.
    pub fn new(
        api: Arc<dyn AstroApi>,
        pacing: PacingConfig,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Session::new(tx);
        let id = session.id;
        (
            Self {
                id,
                session: Arc::new(Mutex::new(session)),
                api,
                pacing,
            },
            rx,
        )
    }

    /// Create a session resuming from a pre-filled profile.
    pub fn resume(
        api: Arc<dyn AstroApi>,
        pacing: PacingConfig,
        profile: BirthProfile,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Session::resume_with(profile, tx);
        let id = session.id;
        (
            Self {
                id,
                session: Arc::new(Mutex::new(session)),
                api,
                pacing,
            },
            rx,
        )
    }

    /// The shared session state (used by the orchestrator and tests).
    pub fn session(&self) -> Arc<Mutex<Session>> {
        Arc::clone(&self.session)
    }

    /// Send the opening prompt, or auto-trigger generation for a complete
    /// profile (debounced so a refresh can still cancel it).
    pub async fn start(&self) {
        let (step, name) = {
            let s = self.session.lock().await;
            (s.step, s.profile.name.clone())
        };
        match step {
            DialogStep::Generating => {
                {
                    let mut s = self.session.lock().await;
                    s.announce_typing();
                    s.say(prompts::generation_started(&name));
                }
                self.schedule_auto_trigger().await;
            }
            DialogStep::AskDob => self.deliver_reply(prompts::resume_ask_dob(&name)).await,
            _ => self.deliver_reply(prompts::greeting()).await,
        }
    }

    /// Process one user message end to end.
    pub async fn handle_user_message(&self, text: &str) {
        let (turn, epoch) = {
            let mut s = self.session.lock().await;
            s.record_user(text);
            let generation = s.generation;
            let before = s.step;
            let mut step = s.step;
            let turn = controller::handle(&mut s.profile, &mut step, generation, text);
            s.step = step;
            if step != before {
                s.emit(SessionEvent::Step { step });
            }
            (turn, s.epoch())
        };

        for reply in &turn.replies {
            self.deliver_reply_at(reply.clone(), epoch).await;
        }

        // A refresh while replies were pacing invalidates the action too.
        if self.session.lock().await.epoch() != epoch {
            return;
        }
        match turn.action {
            Some(TurnAction::StartGeneration) => self.spawn_generation(false).await,
            Some(TurnAction::RearmGeneration) => self.spawn_generation(true).await,
            Some(TurnAction::Chat { message }) => self.forward_to_chat(&message, epoch).await,
            None => {}
        }
    }

    /// Apply the modal form: validate, overwrite the whole profile, submit
    /// the form fire-and-forget, and auto-trigger generation.
    pub async fn apply_form(&self, value: &serde_json::Value) -> Result<(), SessionError> {
        let profile = BirthProfile::from_form_value(value)?;
        {
            let mut s = self.session.lock().await;
            s.profile = profile.clone();
            s.set_step(DialogStep::Generating);
            s.announce_typing();
            s.say(prompts::generation_started(&profile.name));
        }

        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            api.submit_form(&profile).await;
        });

        self.schedule_auto_trigger().await;
        Ok(())
    }

    /// Refresh the session (clears everything atomically under the lock).
    pub async fn refresh(&self) {
        self.session.lock().await.refresh();
    }

    async fn spawn_generation(&self, rearm: bool) {
        let api = Arc::clone(&self.api);
        let session = Arc::clone(&self.session);
        let pacing = self.pacing.clone();
        tokio::spawn(async move {
            generation::run(api, session, pacing, rearm).await;
        });
    }

    /// Debounced auto-trigger; the timer handle is stored on the session so
    /// a refresh cancels it before it fires.
    async fn schedule_auto_trigger(&self) {
        let api = Arc::clone(&self.api);
        let session = Arc::clone(&self.session);
        let pacing = self.pacing.clone();
        let debounce = pacing.auto_trigger_debounce;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            generation::run(api, session, pacing, false).await;
        });
        self.session.lock().await.set_pending_trigger(handle);
    }

    /// Forward a chatting-step message to the completion endpoint; on
    /// failure fall back to a canned reply (plus remedies when the user
    /// voiced a problem), else the generic unavailable message.
    async fn forward_to_chat(&self, message: &str, epoch: u64) {
        let context = {
            let s = self.session.lock().await;
            s.chart_context().cloned()
        };

        let reply = match self.api.chat(message, context.as_ref()).await {
            Ok(reply) => {
                // The backend supplies its own follow-ups; just remember the
                // topic so later fallbacks stay on theme.
                if let Some(topic) = topics::detect(message) {
                    self.session.lock().await.topic_ctx.last_topic = Some(topic);
                }
                reply
            }
            Err(e) => {
                tracing::warn!(error = %e, "Chat endpoint unavailable after retry");
                let mut fallback =
                    prompts::canned_reply(message).unwrap_or_else(prompts::chat_unavailable);
                if remedies::should_append_remedies(message) {
                    fallback.push_str(&remedies::format_compact(remedies::detect_area(message)));
                }
                let follow_up = {
                    let mut s = self.session.lock().await;
                    topics::suggest(message, &mut s.topic_ctx)
                };
                fallback.push_str("\n\n");
                fallback.push_str(&follow_up);
                fallback
            }
        };

        self.deliver_reply_at(reply, epoch).await;
    }

    /// Reveal a reply with typing pacing under the current epoch.
    async fn deliver_reply(&self, reply: String) {
        let epoch = self.session.lock().await.epoch();
        self.deliver_reply_at(reply, epoch).await;
    }

    /// Reveal a reply with typing pacing: split into at most three chunks,
    /// each preceded by its own placeholder, strictly sequential. A refresh
    /// (epoch bump) while pacing discards the remaining chunks.
    async fn deliver_reply_at(&self, reply: String, epoch: u64) {
        let chunks = typing::split_chunks(&reply);
        let total = chunks.len();
        for chunk in chunks {
            {
                let s = self.session.lock().await;
                if s.epoch() != epoch {
                    return;
                }
                s.announce_typing();
            }
            tokio::time::sleep(typing::chunk_delay(&chunk, total, &self.pacing)).await;
            let mut s = self.session.lock().await;
            if s.epoch() != epoch {
                return;
            }
            s.say(chunk);
        }
    }
}

/// Registry of live sessions, one per connected widget.
pub struct SessionManager {
    api: Arc<dyn AstroApi>,
    pacing: PacingConfig,
    sessions: Mutex<HashMap<Uuid, Arc<SessionHandle>>>,
}

impl SessionManager {
    pub fn new(api: Arc<dyn AstroApi>, pacing: PacingConfig) -> Self {
        Self {
            api,
            pacing,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Create and register a fresh session.
    pub async fn create(&self) -> (Arc<SessionHandle>, mpsc::UnboundedReceiver<SessionEvent>) {
        let (handle, rx) = SessionHandle::new(Arc::clone(&self.api), self.pacing.clone());
        let handle = Arc::new(handle);
        self.sessions
            .lock()
            .await
            .insert(handle.id, Arc::clone(&handle));
        (handle, rx)
    }

    /// Create and register a session resuming from a stored profile.
    pub async fn resume(
        &self,
        profile: BirthProfile,
    ) -> (Arc<SessionHandle>, mpsc::UnboundedReceiver<SessionEvent>) {
        let (handle, rx) =
            SessionHandle::resume(Arc::clone(&self.api), self.pacing.clone(), profile);
        let handle = Arc::new(handle);
        self.sessions
            .lock()
            .await
            .insert(handle.id, Arc::clone(&handle));
        (handle, rx)
    }

    /// Drop a session when its client disconnects.
    pub async fn remove(&self, id: Uuid) {
        self.sessions.lock().await.remove(&id);
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

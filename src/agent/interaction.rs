//! Per-card interaction state machine.
//!
//! `Idle -> Triggering -> {Succeeded, Failed}`; both terminal phases accept the
//! next trigger. A card holds at most one pending dispatch: triggers are
//! refused while one is in flight, and a completion is applied only when its
//! sequence number matches the pending one.

use chrono::{Local, Utc};
use log::{debug, info, warn};

use super::attachment::{self, FileRef};
use super::dispatch::Dispatcher;
use super::draft::TextDraft;
use super::error::ValidationError;
use super::history::{InputEcho, RecordStatus, ResponseHistory, ResponseRecord};
use super::model::{Agent, InputSurface, TriggerType};
use super::normalize::{Outcome, ResponseNormalizer};
use super::payload::{Metadata, TriggerInput, build_envelope};

const FALLBACK_ERROR: &str = "Failed to trigger agent";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Triggering,
    Succeeded,
    Failed,
}

/// Input captured when a trigger is accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingInput {
    Click,
    Chat(String),
    Upload(FileRef),
}

impl PendingInput {
    pub fn echo(&self) -> InputEcho {
        match self {
            PendingInput::Click => InputEcho::Clicked,
            PendingInput::Chat(text) => InputEcho::Text(text.clone()),
            PendingInput::Upload(file) => InputEcho::File(file.descriptor()),
        }
    }
}

/// An accepted trigger, detached from the card so it can run on its own task.
#[derive(Debug, Clone)]
pub struct TriggerRequest {
    pub seq: u64,
    pub agent: Agent,
    pub input: PendingInput,
}

impl TriggerRequest {
    /// Payload builder, attachment encoder, dispatcher and normalizer, in order.
    pub async fn execute(
        &self,
        dispatcher: &dyn Dispatcher,
        normalizer: &dyn ResponseNormalizer,
        metadata: &Metadata,
    ) -> Outcome {
        let input = match &self.input {
            PendingInput::Click => TriggerInput::Click,
            PendingInput::Chat(text) => TriggerInput::Chat(text.clone()),
            PendingInput::Upload(file) => TriggerInput::Upload(attachment::encode(file).await),
        };
        let envelope = match build_envelope(&self.agent, input, metadata, Utc::now()) {
            Ok(envelope) => envelope,
            Err(err) => return Outcome::Failure(err.into()),
        };
        let result = match dispatcher.dispatch(&self.agent.webhook_url, &envelope).await {
            Ok(response) => normalizer.normalize(self.agent.return_type, &response),
            Err(err) => Err(err),
        };
        Outcome::from_result(result)
    }
}

#[derive(Debug, Clone)]
struct PendingDispatch {
    seq: u64,
    trigger_type: TriggerType,
    echo: InputEcho,
}

/// Ephemeral state of one mounted agent card. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    pub input_draft: TextDraft,
    pub attachment_draft: Option<FileRef>,
    phase: Phase,
    last_error: Option<String>,
    last_output: Option<String>,
    history: ResponseHistory,
    next_seq: u64,
    pending: Option<PendingDispatch>,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn in_flight(&self) -> bool {
        self.pending.is_some()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn last_output(&self) -> Option<&str> {
        self.last_output.as_deref()
    }

    pub fn history(&self) -> &ResponseHistory {
        &self.history
    }

    /// Whether the card's trigger affordance should be enabled right now.
    pub fn can_trigger(&self, agent: &Agent) -> bool {
        self.validate(agent).is_ok()
    }

    fn validate(&self, agent: &Agent) -> Result<PendingInput, ValidationError> {
        if self.in_flight() {
            return Err(ValidationError::InFlight);
        }
        if !agent.is_active {
            return Err(ValidationError::Inactive);
        }
        match agent.layout().input {
            InputSurface::ClickButton => Ok(PendingInput::Click),
            InputSurface::ChatBox => {
                let trimmed = self.input_draft.text().trim();
                if trimmed.is_empty() {
                    Err(ValidationError::EmptyMessage)
                } else {
                    Ok(PendingInput::Chat(trimmed.to_string()))
                }
            }
            InputSurface::UploadDrop => self
                .attachment_draft
                .clone()
                .map(PendingInput::Upload)
                .ok_or(ValidationError::MissingAttachment),
            InputSurface::AutomaticNotice | InputSurface::NoManualTrigger => {
                Err(ValidationError::NoManualTrigger(agent.trigger_type))
            }
        }
    }

    /// Accepts a trigger and moves to `Triggering`.
    ///
    /// Rejections leave the card untouched.
    pub fn begin(&mut self, agent: &Agent) -> Result<TriggerRequest, ValidationError> {
        let input = self.validate(agent).inspect_err(|err| {
            debug!("Trigger for {} rejected: {}", agent.name, err);
        })?;
        self.next_seq += 1;
        let seq = self.next_seq;
        self.pending = Some(PendingDispatch {
            seq,
            trigger_type: agent.trigger_type,
            echo: input.echo(),
        });
        self.phase = Phase::Triggering;
        self.last_error = None;
        info!("Triggering agent {} (#{})", agent.name, seq);
        Ok(TriggerRequest {
            seq,
            agent: agent.clone(),
            input,
        })
    }

    /// Applies the outcome of request `seq`. Returns `false` if it was stale.
    pub fn complete(&mut self, seq: u64, outcome: Outcome) -> bool {
        let Some(pending) = self.pending.take_if(|pending| pending.seq == seq) else {
            warn!("Discarding completion #{} that is not pending", seq);
            return false;
        };

        let (output, status) = match outcome {
            Outcome::Output(text) => (Some(text), RecordStatus::Success),
            Outcome::Silent => (None, RecordStatus::Success),
            Outcome::Failure(err) => {
                let message = err.to_string();
                warn!("Dispatch #{} failed: {}", seq, message);
                self.last_error = Some(if message.is_empty() {
                    FALLBACK_ERROR.to_string()
                } else {
                    message
                });
                (None, RecordStatus::Error)
            }
        };

        if status == RecordStatus::Success {
            self.last_output = output.clone();
            match pending.trigger_type {
                TriggerType::Chat => self.input_draft.clear(),
                TriggerType::Upload => self.attachment_draft = None,
                TriggerType::Click | TriggerType::Automatic | TriggerType::None => {}
            }
            self.phase = Phase::Succeeded;
            debug!("Dispatch #{} succeeded", seq);
        } else {
            self.phase = Phase::Failed;
        }

        let record = ResponseRecord {
            id: seq,
            timestamp: Local::now(),
            input_echo: pending.echo,
            output,
            status,
        };
        self.history.push_front(record);
        true
    }

    /// Runs one trigger to completion on the current task.
    pub async fn trigger(
        &mut self,
        agent: &Agent,
        dispatcher: &dyn Dispatcher,
        normalizer: &dyn ResponseNormalizer,
        metadata: &Metadata,
    ) -> Result<Phase, ValidationError> {
        let request = self.begin(agent)?;
        let outcome = request.execute(dispatcher, normalizer, metadata).await;
        self.complete(request.seq, outcome);
        Ok(self.phase)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::agent::dispatch::WebhookResponse;
    use crate::agent::error::DispatchError;
    use crate::agent::model::ReturnType;
    use crate::agent::normalize::FieldProbeNormalizer;
    use crate::agent::payload::Envelope;
    use crate::agent::payload::tests::agent;

    /// Replays canned replies and records every envelope it receives.
    struct ScriptedDispatcher {
        replies: Mutex<Vec<Result<WebhookResponse, DispatchError>>>,
        seen: Mutex<Vec<Envelope>>,
    }

    impl ScriptedDispatcher {
        fn new(replies: Vec<Result<WebhookResponse, DispatchError>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Dispatcher for ScriptedDispatcher {
        async fn dispatch(
            &self,
            _webhook_url: &str,
            envelope: &Envelope,
        ) -> Result<WebhookResponse, DispatchError> {
            self.seen.lock().unwrap().push(envelope.clone());
            self.replies.lock().unwrap().remove(0)
        }
    }

    fn text_reply(body: &str) -> Result<WebhookResponse, DispatchError> {
        Ok(WebhookResponse {
            status: 200,
            content_type: Some(String::from("text/plain")),
            body: body.as_bytes().to_vec(),
        })
    }

    fn server_error() -> Result<WebhookResponse, DispatchError> {
        Err(DispatchError::Http {
            status: 500,
            status_text: String::from("Internal Server Error"),
        })
    }

    #[tokio::test]
    async fn chat_failure_keeps_the_draft() {
        let agent = agent(TriggerType::Chat, ReturnType::Chat);
        let dispatcher = ScriptedDispatcher::new(vec![server_error()]);
        let mut card = Interaction::new();
        card.input_draft.set("hello");

        let phase = card
            .trigger(&agent, &dispatcher, &FieldProbeNormalizer, &Metadata::default())
            .await
            .unwrap();

        assert_eq!(phase, Phase::Failed);
        assert!(card.last_error().unwrap().contains("500"));
        assert_eq!(card.input_draft.text(), "hello");
        let head = card.history().latest().unwrap();
        assert_eq!(head.status, RecordStatus::Error);
        assert_eq!(head.output, None);
        assert_eq!(head.input_echo, InputEcho::Text(String::from("hello")));
        assert!(!card.in_flight());
    }

    #[tokio::test]
    async fn chat_success_clears_the_draft() {
        let agent = agent(TriggerType::Chat, ReturnType::Text);
        let dispatcher = ScriptedDispatcher::new(vec![text_reply("pong")]);
        let mut card = Interaction::new();
        card.input_draft.set("  ping  ");

        card.trigger(&agent, &dispatcher, &FieldProbeNormalizer, &Metadata::default())
            .await
            .unwrap();

        assert_eq!(card.last_output(), Some("pong"));
        assert!(card.input_draft.is_empty());
        let sent = dispatcher.seen.lock().unwrap();
        assert_eq!(sent[0].payload.message.as_deref(), Some("ping"));
    }

    #[tokio::test]
    async fn error_then_success_clears_last_error_and_keeps_order() {
        let agent = agent(TriggerType::Click, ReturnType::Text);
        let dispatcher = ScriptedDispatcher::new(vec![server_error(), text_reply("ok")]);
        let normalizer = FieldProbeNormalizer;
        let metadata = Metadata::default();
        let mut card = Interaction::new();

        card.trigger(&agent, &dispatcher, &normalizer, &metadata).await.unwrap();
        assert!(card.last_error().is_some());
        card.trigger(&agent, &dispatcher, &normalizer, &metadata).await.unwrap();

        assert_eq!(card.last_error(), None);
        assert_eq!(card.phase(), Phase::Succeeded);
        let statuses: Vec<RecordStatus> = card.history().iter().map(|r| r.status).collect();
        assert_eq!(statuses, vec![RecordStatus::Success, RecordStatus::Error]);
        assert_eq!(card.history().latest().unwrap().input_echo, InputEcho::Clicked);
    }

    #[test]
    fn rejections_leave_state_untouched() {
        let mut card = Interaction::new();

        let chat = agent(TriggerType::Chat, ReturnType::Text);
        card.input_draft.set("   ");
        assert_eq!(card.begin(&chat).unwrap_err(), ValidationError::EmptyMessage);

        let upload = agent(TriggerType::Upload, ReturnType::Text);
        assert_eq!(card.begin(&upload).unwrap_err(), ValidationError::MissingAttachment);

        let mut inactive = agent(TriggerType::Click, ReturnType::Text);
        inactive.is_active = false;
        assert_eq!(card.begin(&inactive).unwrap_err(), ValidationError::Inactive);

        let automatic = agent(TriggerType::Automatic, ReturnType::Text);
        assert_eq!(
            card.begin(&automatic).unwrap_err(),
            ValidationError::NoManualTrigger(TriggerType::Automatic)
        );

        assert_eq!(card.phase(), Phase::Idle);
        assert!(card.history().is_empty());
    }

    #[test]
    fn second_trigger_is_refused_while_in_flight() {
        let click = agent(TriggerType::Click, ReturnType::Text);
        let mut card = Interaction::new();
        let first = card.begin(&click).unwrap();
        assert_eq!(card.phase(), Phase::Triggering);
        assert_eq!(card.begin(&click).unwrap_err(), ValidationError::InFlight);
        assert!(!card.can_trigger(&click));

        assert!(!card.complete(first.seq + 1, Outcome::Silent));
        assert!(card.in_flight());
        assert!(card.complete(first.seq, Outcome::Silent));
        assert!(!card.complete(first.seq, Outcome::Silent));
        assert_eq!(card.history().len(), 1);
        assert_eq!(card.last_output(), None);
    }

    #[test]
    fn history_is_bounded_and_newest_first() {
        let click = agent(TriggerType::Click, ReturnType::Text);
        let mut card = Interaction::new();
        let mut last = 0;
        for n in 0..14 {
            let request = card.begin(&click).unwrap();
            last = request.seq;
            card.complete(request.seq, Outcome::Output(format!("run {n}")));
        }
        assert_eq!(card.history().len(), 10);
        assert_eq!(card.history().latest().unwrap().id, last);
        assert_eq!(card.last_output(), Some("run 13"));
    }

    #[tokio::test]
    async fn upload_success_clears_attachment() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[7u8; 500]).unwrap();

        let upload = agent(TriggerType::Upload, ReturnType::Text);
        let dispatcher = ScriptedDispatcher::new(vec![text_reply("done")]);
        let mut card = Interaction::new();
        card.attachment_draft = Some(FileRef::from_path(file.path()).unwrap());

        card.trigger(&upload, &dispatcher, &FieldProbeNormalizer, &Metadata::default())
            .await
            .unwrap();

        assert_eq!(card.last_output(), Some("done"));
        assert!(card.attachment_draft.is_none());
        assert_eq!(card.history().latest().unwrap().status, RecordStatus::Success);
        let sent = dispatcher.seen.lock().unwrap();
        let file_payload = sent[0].payload.file.as_ref().unwrap();
        assert_eq!(file_payload.size, 500);
        assert!(file_payload.content.as_deref().unwrap().starts_with("data:"));
    }
}

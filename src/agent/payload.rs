//! 封包建構器：由觸發方式與使用者輸入組出送往 webhook 的標準封包。
//!
//! 此模組為純函式，不做任何 I/O；附件必須先經過 `attachment::encode`。

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::attachment::FilePayload;
use super::error::ValidationError;
use super::model::{Agent, ReturnType, TriggerType};

/// `payload.triggered_by` 的固定值。
pub const TRIGGERED_BY_USER: &str = "user";

/// 封包中 `metadata` 區塊，標示送出端的來源與版本。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub source: String,
    pub version: String,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            source: String::from("bureau"),
            version: String::from("1.0.0"),
        }
    }
}

/// 送往 webhook 的完整封包。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub agent_id: String,
    pub agent_name: String,
    pub trigger_type: TriggerType,
    pub return_type: ReturnType,
    pub payload: Payload,
    pub metadata: Metadata,
}

/// 依觸發方式而異的欄位，加上每次都會帶的 `timestamp` 與 `triggered_by`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FilePayload>,
    pub timestamp: String,
    pub triggered_by: String,
}

/// 使用者在卡片上提供的輸入。
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerInput {
    Click,
    Chat(String),
    Upload(FilePayload),
}

/// 建構封包。
///
/// `automatic` 與 `none` 代理沒有手動觸發入口，一律拒絕；
/// `chat` 的訊息會先去除頭尾空白，空白訊息不可送出。
pub fn build_envelope(
    agent: &Agent,
    input: TriggerInput,
    metadata: &Metadata,
    now: DateTime<Utc>,
) -> Result<Envelope, ValidationError> {
    let (message, file) = match (agent.trigger_type, input) {
        (TriggerType::Automatic | TriggerType::None, _) => {
            return Err(ValidationError::NoManualTrigger(agent.trigger_type));
        }
        (TriggerType::Click, TriggerInput::Click) => (None, None),
        (TriggerType::Chat, TriggerInput::Chat(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(ValidationError::EmptyMessage);
            }
            (Some(trimmed.to_string()), None)
        }
        (TriggerType::Upload, TriggerInput::Upload(file)) => (None, Some(file)),
        (trigger, _) => return Err(ValidationError::ModalityMismatch(trigger)),
    };

    Ok(Envelope {
        agent_id: agent.id.clone(),
        agent_name: agent.name.clone(),
        trigger_type: agent.trigger_type,
        return_type: agent.return_type,
        payload: Payload {
            message,
            file,
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            triggered_by: TRIGGERED_BY_USER.to_string(),
        },
        metadata: metadata.clone(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    pub(crate) fn agent(trigger: TriggerType, ret: ReturnType) -> Agent {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Agent {
            id: String::from("agent-1"),
            name: String::from("Summarizer"),
            description: None,
            trigger_type: trigger,
            return_type: ret,
            webhook_url: String::from("http://localhost/hook"),
            workflow_url: None,
            department_id: String::from("dept-1"),
            is_active: true,
            created_at: created,
            updated_at: created,
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()
    }

    #[test]
    fn click_payload_only_has_fixed_fields() {
        let agent = agent(TriggerType::Click, ReturnType::Text);
        let envelope =
            build_envelope(&agent, TriggerInput::Click, &Metadata::default(), fixed_now())
                .unwrap();
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({
                "agent_id": "agent-1",
                "agent_name": "Summarizer",
                "trigger_type": "click",
                "return_type": "text",
                "payload": {
                    "timestamp": "2024-05-06T07:08:09.000Z",
                    "triggered_by": "user"
                },
                "metadata": { "source": "bureau", "version": "1.0.0" }
            })
        );
    }

    #[test]
    fn chat_message_is_trimmed() {
        let agent = agent(TriggerType::Chat, ReturnType::Chat);
        let envelope = build_envelope(
            &agent,
            TriggerInput::Chat(String::from("  hello there \n")),
            &Metadata::default(),
            fixed_now(),
        )
        .unwrap();
        assert_eq!(envelope.payload.message.as_deref(), Some("hello there"));
        assert!(envelope.payload.file.is_none());
    }

    #[test]
    fn blank_chat_is_rejected() {
        let agent = agent(TriggerType::Chat, ReturnType::Text);
        let err = build_envelope(
            &agent,
            TriggerInput::Chat(String::from(" \t ")),
            &Metadata::default(),
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::EmptyMessage);
    }

    #[test]
    fn automatic_and_none_agents_cannot_be_built() {
        for trigger in [TriggerType::Automatic, TriggerType::None] {
            let agent = agent(trigger, ReturnType::Text);
            let err =
                build_envelope(&agent, TriggerInput::Click, &Metadata::default(), fixed_now())
                    .unwrap_err();
            assert_eq!(err, ValidationError::NoManualTrigger(trigger));
        }
    }

    #[test]
    fn mismatched_input_is_rejected() {
        let agent = agent(TriggerType::Upload, ReturnType::Text);
        let err = build_envelope(&agent, TriggerInput::Click, &Metadata::default(), fixed_now())
            .unwrap_err();
        assert_eq!(err, ValidationError::ModalityMismatch(TriggerType::Upload));
    }
}

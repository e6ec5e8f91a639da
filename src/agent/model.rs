use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 代理的觸發方式，決定卡片上提供哪一種手動操作。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerType {
    Click,
    Chat,
    Upload,
    Automatic,
    None,
}

impl TriggerType {
    pub const ALL: [TriggerType; 5] = [
        TriggerType::Click,
        TriggerType::Chat,
        TriggerType::Upload,
        TriggerType::Automatic,
        TriggerType::None,
    ];

    /// 序列化時使用的字串，與 webhook 封包中的 `trigger_type` 相同。
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerType::Click => "click",
            TriggerType::Chat => "chat",
            TriggerType::Upload => "upload",
            TriggerType::Automatic => "automatic",
            TriggerType::None => "none",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TriggerType::Click => "User clicks a button to trigger the agent",
            TriggerType::Chat => "User sends a message to trigger the agent",
            TriggerType::Upload => "User uploads a file to trigger the agent",
            TriggerType::Automatic => "Agent runs on a schedule or event",
            TriggerType::None => "Agent is triggered externally",
        }
    }

    /// 在表單中循環切換選項。
    pub fn cycle(&self, delta: isize) -> Self {
        cycle_in(&Self::ALL, self, delta)
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 代理回應的呈現方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnType {
    None,
    Text,
    Chat,
}

impl ReturnType {
    pub const ALL: [ReturnType; 3] = [ReturnType::None, ReturnType::Text, ReturnType::Chat];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnType::None => "none",
            ReturnType::Text => "text",
            ReturnType::Chat => "chat",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ReturnType::None => "Agent processes but returns nothing",
            ReturnType::Text => "Agent returns text or data",
            ReturnType::Chat => "Agent replies in a chat transcript",
        }
    }

    pub fn cycle(&self, delta: isize) -> Self {
        cycle_in(&Self::ALL, self, delta)
    }
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn cycle_in<T: Copy + PartialEq>(all: &[T], current: &T, delta: isize) -> T {
    let len = all.len() as isize;
    let index = all.iter().position(|item| item == current).unwrap_or(0) as isize;
    all[(index + delta).rem_euclid(len) as usize]
}

/// 一個已設定的代理。此結構由持久化層擁有，對派送核心而言為唯讀資料。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub trigger_type: TriggerType,
    pub return_type: ReturnType,
    pub webhook_url: String,
    /// 僅供顯示的工作流程連結。
    #[serde(default)]
    pub workflow_url: Option<String>,
    pub department_id: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Agent {
    pub fn layout(&self) -> CardLayout {
        CardLayout::resolve(self.trigger_type, self.return_type)
    }
}

/// The input affordance rendered on an agent card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSurface {
    ClickButton,
    ChatBox,
    UploadDrop,
    AutomaticNotice,
    NoManualTrigger,
}

impl InputSurface {
    /// Only these surfaces can ever reach the payload builder.
    pub fn accepts_manual_trigger(&self) -> bool {
        matches!(
            self,
            InputSurface::ClickButton | InputSurface::ChatBox | InputSurface::UploadDrop
        )
    }
}

/// The output area rendered on an agent card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSurface {
    Hidden,
    TextPanel,
    ChatTranscript,
}

/// Resolved card shape for one `(trigger, return)` combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardLayout {
    pub input: InputSurface,
    pub output: OutputSurface,
    /// `chat -> chat` folds the composer into the transcript.
    pub unified_chat: bool,
    /// `none -> none` has nothing to show but a notice.
    pub external_only: bool,
}

impl CardLayout {
    const fn new(input: InputSurface, output: OutputSurface) -> Self {
        Self {
            input,
            output,
            unified_chat: false,
            external_only: false,
        }
    }

    /// Every pair is listed on purpose; a new modality must be placed here.
    pub fn resolve(trigger: TriggerType, ret: ReturnType) -> Self {
        use InputSurface as I;
        use OutputSurface as O;
        match (trigger, ret) {
            (TriggerType::Click, ReturnType::None) => Self::new(I::ClickButton, O::Hidden),
            (TriggerType::Click, ReturnType::Text) => Self::new(I::ClickButton, O::TextPanel),
            (TriggerType::Click, ReturnType::Chat) => Self::new(I::ClickButton, O::ChatTranscript),
            (TriggerType::Chat, ReturnType::None) => Self::new(I::ChatBox, O::Hidden),
            (TriggerType::Chat, ReturnType::Text) => Self::new(I::ChatBox, O::TextPanel),
            (TriggerType::Chat, ReturnType::Chat) => Self {
                unified_chat: true,
                ..Self::new(I::ChatBox, O::ChatTranscript)
            },
            (TriggerType::Upload, ReturnType::None) => Self::new(I::UploadDrop, O::Hidden),
            (TriggerType::Upload, ReturnType::Text) => Self::new(I::UploadDrop, O::TextPanel),
            (TriggerType::Upload, ReturnType::Chat) => {
                Self::new(I::UploadDrop, O::ChatTranscript)
            }
            (TriggerType::Automatic, ReturnType::None) => Self::new(I::AutomaticNotice, O::Hidden),
            (TriggerType::Automatic, ReturnType::Text) => {
                Self::new(I::AutomaticNotice, O::TextPanel)
            }
            (TriggerType::Automatic, ReturnType::Chat) => {
                Self::new(I::AutomaticNotice, O::ChatTranscript)
            }
            (TriggerType::None, ReturnType::None) => Self {
                external_only: true,
                ..Self::new(I::NoManualTrigger, O::Hidden)
            },
            (TriggerType::None, ReturnType::Text) => Self::new(I::NoManualTrigger, O::TextPanel),
            (TriggerType::None, ReturnType::Chat) => {
                Self::new(I::NoManualTrigger, O::ChatTranscript)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_click_chat_upload_accept_manual_triggers() {
        for trigger in TriggerType::ALL {
            for ret in ReturnType::ALL {
                let layout = CardLayout::resolve(trigger, ret);
                let expected = matches!(
                    trigger,
                    TriggerType::Click | TriggerType::Chat | TriggerType::Upload
                );
                assert_eq!(layout.input.accepts_manual_trigger(), expected);
                assert_eq!(layout.output == OutputSurface::Hidden, ret == ReturnType::None);
            }
        }
    }

    #[test]
    fn special_layouts() {
        assert!(CardLayout::resolve(TriggerType::Chat, ReturnType::Chat).unified_chat);
        assert!(CardLayout::resolve(TriggerType::None, ReturnType::None).external_only);
        assert!(!CardLayout::resolve(TriggerType::Chat, ReturnType::Text).unified_chat);
    }

    #[test]
    fn enums_use_lowercase_wire_names() {
        assert_eq!(serde_json::to_string(&TriggerType::Automatic).unwrap(), "\"automatic\"");
        assert_eq!(serde_json::to_string(&ReturnType::None).unwrap(), "\"none\"");
        assert_eq!(TriggerType::None.cycle(1), TriggerType::Click);
        assert_eq!(ReturnType::None.cycle(-1), ReturnType::Chat);
    }
}

use crate::agent::{
    Agent, CardId, CardLayout, Completion, Interaction, ResponseRecord, TriggerRunner,
    ValidationError,
};

/// 文字輸出超過此長度時預設只顯示前幾行。
pub const CLAMP_THRESHOLD: usize = 200;
/// 收合時顯示的行數。
pub const CLAMP_LINES: usize = 3;
/// 未展開時顯示的歷史筆數。
pub const HISTORY_PREVIEW: usize = 3;

pub const CHAT_PLACEHOLDER: &str = "Chat responses will appear here";
/// 沒有輸出的歷史紀錄顯示的文字。
pub const NO_RESPONSE: &str = "No response";

/// 聊天紀錄中的一則訊息。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptLine {
    You(String),
    Agent(String),
    /// 派送中的代理回覆。
    AgentPending,
}

/// 掛載中的代理卡片：代理資料的副本加上它的互動狀態。
pub struct AgentCard {
    id: CardId,
    pub agent: Agent,
    pub interaction: Interaction,
    pub expanded: bool,
    pub show_all: bool,
}

impl AgentCard {
    pub fn new(id: CardId, agent: Agent) -> Self {
        Self {
            id,
            agent,
            interaction: Interaction::new(),
            expanded: false,
            show_all: false,
        }
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn layout(&self) -> CardLayout {
        self.agent.layout()
    }

    pub fn can_trigger(&self) -> bool {
        self.interaction.can_trigger(&self.agent)
    }

    /// 接受觸發並交給背景任務執行。
    pub fn trigger(&mut self, runner: &TriggerRunner) -> Result<(), ValidationError> {
        let request = self.interaction.begin(&self.agent)?;
        runner.spawn(self.id, request);
        Ok(())
    }

    /// 套用背景任務的結果；不屬於此卡片或已過期的結果會被丟棄。
    pub fn apply(&mut self, completion: Completion) -> bool {
        if completion.card != self.id {
            return false;
        }
        self.interaction.complete(completion.seq, completion.outcome)
    }

    /// 最新輸出是否因為過長而收合。
    pub fn is_clamped(&self) -> bool {
        !self.expanded && self.output_is_long()
    }

    pub fn output_is_long(&self) -> bool {
        self.interaction
            .last_output()
            .is_some_and(|output| output.chars().count() > CLAMP_THRESHOLD)
    }

    pub fn visible_history(&self) -> Vec<&ResponseRecord> {
        let limit = if self.show_all {
            usize::MAX
        } else {
            HISTORY_PREVIEW
        };
        self.interaction.history().iter().take(limit).collect()
    }

    /// 聊天紀錄：歷史依儲存順序（最新在前），接著是派送中的回覆或最新輸出。
    pub fn transcript(&self) -> Vec<TranscriptLine> {
        let mut lines = Vec::new();
        for record in self.interaction.history().iter() {
            lines.push(TranscriptLine::You(record.input_echo.to_string()));
            if let Some(output) = &record.output {
                lines.push(TranscriptLine::Agent(output.clone()));
            }
        }
        if self.interaction.in_flight() {
            lines.push(TranscriptLine::AgentPending);
        } else if let Some(output) = self.interaction.last_output() {
            lines.push(TranscriptLine::Agent(output.to_string()));
        }
        lines
    }
}

/// One line of a history entry. Failed and silent dispatches both read "No response".
pub fn history_summary(record: &ResponseRecord) -> &str {
    record.output.as_deref().unwrap_or(NO_RESPONSE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::model::{ReturnType, TriggerType};
    use crate::agent::normalize::Outcome;
    use crate::agent::payload::tests::agent;
    use crate::agent::{DispatchError, RecordStatus};

    fn completion(card: CardId, seq: u64, outcome: Outcome) -> Completion {
        Completion { card, seq, outcome }
    }

    fn chat_card() -> AgentCard {
        AgentCard::new(CardId(7), agent(TriggerType::Chat, ReturnType::Chat))
    }

    #[test]
    fn completions_for_other_cards_are_ignored() {
        let mut card = chat_card();
        card.interaction.input_draft.set("hi");
        let request = card.interaction.begin(&card.agent).unwrap();

        assert!(!card.apply(completion(CardId(8), request.seq, Outcome::Silent)));
        assert!(card.interaction.in_flight());
        assert!(card.apply(completion(CardId(7), request.seq, Outcome::Silent)));
        assert!(!card.interaction.in_flight());
    }

    #[test]
    fn transcript_follows_history_then_pending_bubble() {
        let mut card = chat_card();
        assert!(card.transcript().is_empty());

        card.interaction.input_draft.set("first");
        let seq = card.interaction.begin(&card.agent).unwrap().seq;
        card.apply(completion(CardId(7), seq, Outcome::Output(String::from("one"))));

        card.interaction.input_draft.set("second");
        card.interaction.begin(&card.agent).unwrap();

        assert_eq!(
            card.transcript(),
            vec![
                TranscriptLine::You(String::from("first")),
                TranscriptLine::Agent(String::from("one")),
                TranscriptLine::AgentPending,
            ]
        );
    }

    #[test]
    fn failed_records_have_no_agent_line() {
        let mut card = chat_card();
        card.interaction.input_draft.set("hello");
        let seq = card.interaction.begin(&card.agent).unwrap().seq;
        card.apply(completion(
            CardId(7),
            seq,
            Outcome::Failure(DispatchError::Network(String::from("refused"))),
        ));

        assert_eq!(
            card.transcript(),
            vec![TranscriptLine::You(String::from("hello"))]
        );
        let records = card.visible_history();
        assert_eq!(records[0].status, RecordStatus::Error);
        assert_eq!(history_summary(records[0]), "No response");
    }

    #[test]
    fn long_output_is_clamped_until_expanded() {
        let mut card = AgentCard::new(CardId(1), agent(TriggerType::Click, ReturnType::Text));
        let seq = card.interaction.begin(&card.agent).unwrap().seq;
        card.apply(completion(CardId(1), seq, Outcome::Output("x".repeat(201))));
        assert!(card.is_clamped());
        card.expanded = true;
        assert!(!card.is_clamped());
    }

    #[test]
    fn history_preview_shows_three_newest() {
        let mut card = AgentCard::new(CardId(1), agent(TriggerType::Click, ReturnType::Text));
        for n in 0..5 {
            let seq = card.interaction.begin(&card.agent).unwrap().seq;
            card.apply(completion(CardId(1), seq, Outcome::Output(n.to_string())));
        }
        let ids: Vec<u64> = card.visible_history().iter().map(|r| r.id).collect();
        assert_eq!(ids, [5, 4, 3]);
        card.show_all = true;
        assert_eq!(card.visible_history().len(), 5);
    }
}

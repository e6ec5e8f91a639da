use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::theme::*;
use super::{pane_block, push_wrapped_line, wrap_to_width};
use crate::agent::{InputSurface, OutputSurface, RecordStatus};
use crate::app::App;
use crate::definitions::FocusArea;
use crate::panels::card::{
    AgentCard, CHAT_PLACEHOLDER, CLAMP_LINES, HISTORY_PREVIEW, TranscriptLine, history_summary,
};

const COMPOSER_HEIGHT: u16 = 5;

pub(super) fn render_card(f: &mut Frame<'_>, app: &App, area: Rect) {
    let focused = app.focus == FocusArea::Card;
    let Some(card) = app.selected_card() else {
        let block = pane_block("Agent Card", focused);
        let hint = Paragraph::new("Select an agent to open its card")
            .style(Style::default().fg(FG_DIM).bg(BG_PANEL))
            .block(block);
        f.render_widget(hint, area);
        return;
    };

    let block = pane_block(card.agent.name.as_str(), focused);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let layout = card.layout();
    let has_composer = card.agent.is_active && layout.input == InputSurface::ChatBox;
    let (body_area, composer_area) = if has_composer {
        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(COMPOSER_HEIGHT)])
            .split(inner);
        (sections[0], Some(sections[1]))
    } else {
        (inner, None)
    };

    let width = body_area.width.max(1) as usize;
    let mut lines: Vec<Line> = Vec::new();
    push_header(&mut lines, card, width);

    if !card.agent.is_active {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Agent is inactive",
            Style::default().fg(FG_PRIMARY).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            "Press a in the agent list to activate",
            Style::default().fg(FG_DIM),
        )));
    } else if layout.external_only {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Agent configured for external triggers only",
            Style::default().fg(FG_DIM),
        )));
    } else {
        lines.push(Line::from(""));
        push_input(&mut lines, card, layout.input);
        if !has_composer {
            push_error(&mut lines, card, width);
        }
        lines.push(Line::from(""));
        match layout.output {
            OutputSurface::Hidden => lines.push(Line::from(Span::styled(
                "No output expected",
                Style::default().fg(FG_DIM),
            ))),
            OutputSurface::TextPanel => push_text_output(&mut lines, card, width),
            OutputSurface::ChatTranscript => push_transcript(&mut lines, card, width),
        }
    }

    // 內容超出高度時保留最後的部分，讓最新狀態可見。
    let overflow = lines.len().saturating_sub(body_area.height as usize);
    let body = Paragraph::new(lines)
        .style(Style::default().bg(BG_PANEL))
        .scroll((overflow.min(u16::MAX as usize) as u16, 0));
    f.render_widget(body, body_area);

    if let Some(area) = composer_area {
        render_composer(f, card, area, focused);
    }
}

fn push_header(lines: &mut Vec<Line>, card: &AgentCard, width: usize) {
    let agent = &card.agent;
    let (status, status_style) = if agent.is_active {
        ("Active", Style::default().fg(STATUS_ACTIVE))
    } else {
        ("Inactive", Style::default().fg(FG_DIM))
    };
    lines.push(Line::from(vec![
        Span::styled(format!("{} ", status), status_style),
        Span::styled(
            format!("· {} → {}", agent.trigger_type, agent.return_type),
            Style::default().fg(FG_PRIMARY),
        ),
    ]));
    if let Some(description) = &agent.description {
        push_wrapped_line(lines, description, Style::default().fg(FG_DIM), width);
    }
    if let Some(workflow) = &agent.workflow_url {
        push_wrapped_line(
            lines,
            &format!("Workflow: {}", workflow),
            Style::default().fg(CHAT_USER).add_modifier(Modifier::UNDERLINED),
            width,
        );
    }
}

fn button<'a>(label: &'a str, enabled: bool) -> Span<'a> {
    let style = if enabled {
        Style::default()
            .fg(Color::Black)
            .bg(PANEL_HIGHLIGHT_BG)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(FG_DIM).bg(BG_OUTPUT)
    };
    Span::styled(format!(" {} ", label), style)
}

fn push_input(lines: &mut Vec<Line>, card: &AgentCard, input: InputSurface) {
    let in_flight = card.interaction.in_flight();
    match input {
        InputSurface::ClickButton => {
            let label = if in_flight { "Running..." } else { "Trigger Agent" };
            lines.push(Line::from(vec![
                button(label, card.can_trigger()),
                Span::styled("  Enter", Style::default().fg(FG_DIM)),
            ]));
        }
        InputSurface::ChatBox => {
            lines.push(Line::from(Span::styled(
                "Enter send · Shift+Enter / Alt+Enter / Ctrl+J newline",
                Style::default().fg(FG_DIM),
            )));
        }
        InputSurface::UploadDrop => {
            match &card.interaction.attachment_draft {
                Some(file) => lines.push(Line::from(vec![
                    Span::styled(file.name.clone(), Style::default().fg(FG_PRIMARY)),
                    Span::styled(format!("  ({})", file.size_label()), Style::default().fg(FG_DIM)),
                ])),
                None => lines.push(Line::from(Span::styled(
                    "No file selected · Ctrl+O to attach",
                    Style::default().fg(FG_DIM),
                ))),
            }
            let label = if in_flight { "Processing..." } else { "Upload & Process" };
            lines.push(Line::from(vec![
                button(label, card.can_trigger()),
                Span::styled("  Enter · Ctrl+X clears", Style::default().fg(FG_DIM)),
            ]));
        }
        InputSurface::AutomaticNotice => lines.push(Line::from(Span::styled(
            "Automatic trigger enabled",
            Style::default().fg(FG_DIM),
        ))),
        InputSurface::NoManualTrigger => lines.push(Line::from(Span::styled(
            "No manual trigger",
            Style::default().fg(FG_DIM),
        ))),
    }
}

fn push_error(lines: &mut Vec<Line>, card: &AgentCard, width: usize) {
    if let Some(error) = card.interaction.last_error() {
        push_wrapped_line(lines, error, Style::default().fg(STATUS_ERROR), width);
    }
}

fn push_text_output(lines: &mut Vec<Line>, card: &AgentCard, width: usize) {
    let interaction = &card.interaction;
    let in_flight = interaction.in_flight();
    if in_flight || interaction.last_output().is_some() {
        lines.push(Line::from(Span::styled(
            "Latest Response",
            Style::default().fg(FG_PRIMARY).add_modifier(Modifier::BOLD),
        )));
        let text_style = Style::default().fg(FG_PRIMARY).bg(BG_OUTPUT);
        if in_flight {
            lines.push(Line::from(Span::styled("Processing...", text_style)));
        } else if let Some(output) = interaction.last_output() {
            let mut wrapped = Vec::new();
            push_wrapped_line(&mut wrapped, output, text_style, width);
            if card.is_clamped() {
                wrapped.truncate(CLAMP_LINES);
            }
            lines.extend(wrapped);
            if card.output_is_long() {
                let toggle = if card.expanded { "Show Less" } else { "Show More" };
                lines.push(Line::from(Span::styled(
                    format!("{} (Ctrl+E)", toggle),
                    Style::default().fg(FG_DIM),
                )));
            }
        }
        lines.push(Line::from(""));
    }

    let history = interaction.history();
    if history.is_empty() {
        return;
    }
    let mut title = vec![Span::styled(
        format!("Response History ({})", history.len()),
        Style::default().fg(FG_PRIMARY).add_modifier(Modifier::BOLD),
    )];
    if history.len() > HISTORY_PREVIEW {
        let toggle = if card.show_all { "Show Less" } else { "Show All" };
        title.push(Span::styled(
            format!("  {} (Ctrl+L)", toggle),
            Style::default().fg(FG_DIM),
        ));
    }
    lines.push(Line::from(title));
    for record in card.visible_history() {
        let summary_style = match (&record.output, record.status) {
            (Some(_), _) => Style::default().fg(FG_PRIMARY),
            (None, RecordStatus::Error) => Style::default()
                .fg(STATUS_ERROR)
                .add_modifier(Modifier::ITALIC),
            (None, RecordStatus::Success) => {
                Style::default().fg(FG_DIM).add_modifier(Modifier::ITALIC)
            }
        };
        let summary = history_summary(record);
        let prefix = format!("{} ", record.timestamp.format("%H:%M:%S"));
        let available = width.saturating_sub(prefix.chars().count()).max(1);
        let mut segments = wrap_to_width(&summary.replace('\n', " "), available);
        segments.truncate(2);
        for (idx, segment) in segments.into_iter().enumerate() {
            let lead = if idx == 0 {
                Span::styled(prefix.clone(), Style::default().fg(FG_DIM))
            } else {
                Span::raw(" ".repeat(prefix.chars().count()))
            };
            lines.push(Line::from(vec![lead, Span::styled(segment, summary_style)]));
        }
    }
}

fn push_transcript(lines: &mut Vec<Line>, card: &AgentCard, width: usize) {
    lines.push(Line::from(Span::styled(
        "Chat Output",
        Style::default().fg(FG_PRIMARY).add_modifier(Modifier::BOLD),
    )));
    let transcript = card.transcript();
    if transcript.is_empty() {
        lines.push(Line::from(Span::styled(
            CHAT_PLACEHOLDER,
            Style::default().fg(FG_DIM).add_modifier(Modifier::ITALIC),
        )));
        return;
    }
    for entry in transcript {
        match entry {
            TranscriptLine::You(text) => {
                push_wrapped_line(
                    lines,
                    &format!("You: {}", text),
                    Style::default().fg(CHAT_USER),
                    width,
                );
            }
            TranscriptLine::Agent(text) => {
                push_wrapped_line(
                    lines,
                    &format!("Agent: {}", text),
                    Style::default().fg(FG_PRIMARY),
                    width,
                );
            }
            TranscriptLine::AgentPending => lines.push(Line::from(Span::styled(
                "Agent: …",
                Style::default().fg(FG_DIM),
            ))),
        }
    }
}

fn render_composer(f: &mut Frame<'_>, card: &AgentCard, area: Rect, focused: bool) {
    let in_flight = card.interaction.in_flight();
    let title = if in_flight {
        "Message (waiting for reply)"
    } else {
        "Message (Enter 傳送 / Alt+Enter 或 Ctrl+J 換行)"
    };
    let mut block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(BORDER_IDLE))
        .title(Span::styled(title, Style::default().fg(FG_PRIMARY)))
        .style(Style::default().bg(BG_PANEL));
    if focused {
        block = block.border_style(Style::default().fg(BORDER_FOCUS));
    }
    let inner = block.inner(area);

    let draft = &card.interaction.input_draft;
    let mut lines: Vec<Line> = if draft.is_empty() {
        vec![Line::from(Span::styled(
            "Type your message...",
            Style::default().fg(FG_DIM),
        ))]
    } else {
        draft
            .text()
            .split('\n')
            .map(|line| Line::from(Span::styled(line.to_string(), Style::default().fg(FG_PRIMARY))))
            .collect()
    };
    if let Some(error) = card.interaction.last_error() {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(STATUS_ERROR),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(BG_PANEL))
        .wrap(Wrap { trim: false });
    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);

    if focused && !in_flight {
        let width = inner.width.max(1) as usize;
        let (cursor_col, cursor_row) = draft.cursor_display_position(width);
        let cursor_x = inner
            .x
            .saturating_add(cursor_col.min(width.saturating_sub(1) as u16));
        let cursor_y = inner
            .y
            .saturating_add(cursor_row.min(inner.height.saturating_sub(1)));
        f.set_cursor(cursor_x, cursor_y);
    }
}

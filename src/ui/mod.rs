use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use unicode_width::UnicodeWidthChar;

use crate::app::{
    AgentFormState, App, ConfirmDeleteState, DeleteTarget, InputPromptState, OfficeSwitcherState,
    OverlayState, PendingInputAction,
};
use crate::definitions::{FocusArea, FormField};

mod card;
mod theme;
use theme::*;

pub fn render(f: &mut Frame<'_>, app: &App) {
    let size = f.size();
    if size.width < 80 || size.height < 24 {
        let block = Paragraph::new("終端機視窗過小，請調整至至少 80x24。")
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title("Bureau")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(FG_PRIMARY).bg(MENU_BG)),
            )
            .style(Style::default().fg(FG_PRIMARY).bg(BG_PRIMARY));
        f.render_widget(block, size);
        return;
    }

    let base = Block::default().style(Style::default().bg(BG_PRIMARY));
    f.render_widget(base, size);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(size);
    let header_area = vertical[0];
    let workspace = vertical[1];
    let status_area = vertical[2];

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(24),
            Constraint::Percentage(30),
            Constraint::Percentage(46),
        ])
        .split(workspace);

    render_header(f, app, header_area);
    render_departments(f, app, panes[0]);
    render_agents(f, app, panes[1]);
    card::render_card(f, app, panes[2]);
    render_status_bar(f, app, status_area);

    if let Some(overlay) = app.overlay.as_ref() {
        render_overlay(f, app, overlay);
    }
}

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    let border = if focused {
        Style::default()
            .fg(BORDER_FOCUS)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(BORDER_IDLE)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::styled(title, Style::default().fg(FG_PRIMARY)))
        .style(Style::default().bg(BG_PANEL))
}

fn render_header(f: &mut Frame<'_>, app: &App, area: Rect) {
    let office = app
        .office
        .as_ref()
        .map(|office| office.name.as_str())
        .unwrap_or("(no office)");
    let mut spans = vec![
        Span::styled(
            " Bureau ",
            Style::default()
                .fg(BAR_TEXT)
                .bg(BAR_HIGHLIGHT_BG)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {} ", office), Style::default().fg(BAR_TEXT)),
    ];
    if let Some(description) = app
        .office
        .as_ref()
        .and_then(|office| office.description.as_deref())
    {
        spans.push(Span::styled(
            format!("· {} ", description),
            Style::default().fg(FG_DIM),
        ));
    }
    spans.push(Span::styled(
        format!("· {}", app.identity.user_id),
        Style::default().fg(BAR_TEXT),
    ));
    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(BAR_BG));
    f.render_widget(header, area);
}

fn render_departments(f: &mut Frame<'_>, app: &App, area: Rect) {
    let block = pane_block("Departments", app.focus == FocusArea::Departments);
    let items: Vec<ListItem> = if app.departments.is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "No departments yet (n to create)",
            Style::default().fg(FG_DIM),
        )))]
    } else {
        app.departments
            .iter()
            .map(|summary| {
                ListItem::new(vec![
                    Line::from(Span::styled(
                        summary.department.name.clone(),
                        Style::default().fg(FG_PRIMARY).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        format!(
                            "  {} agents · {} active",
                            summary.agent_count, summary.active_count
                        ),
                        Style::default().fg(FG_DIM),
                    )),
                ])
            })
            .collect()
    };
    let mut state = ListState::default();
    if !app.departments.is_empty() {
        state.select(Some(app.department_index));
    }
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(PANEL_HIGHLIGHT_BG).fg(Color::Black));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_agents(f: &mut Frame<'_>, app: &App, area: Rect) {
    let block = pane_block("Agents", app.focus == FocusArea::Agents);
    let items: Vec<ListItem> = if app.agents.is_empty() {
        let hint = if app.selected_department().is_some() {
            "No agents yet (n to create)"
        } else {
            "Select a department"
        };
        vec![ListItem::new(Line::from(Span::styled(
            hint,
            Style::default().fg(FG_DIM),
        )))]
    } else {
        app.agents
            .iter()
            .map(|agent| {
                let (marker, marker_style) = if agent.is_active {
                    ("●", Style::default().fg(STATUS_ACTIVE))
                } else {
                    ("○", Style::default().fg(FG_DIM))
                };
                let busy = app
                    .cards
                    .get(&agent.id)
                    .is_some_and(|card| card.interaction.in_flight());
                let mut title = vec![
                    Span::styled(format!("{} ", marker), marker_style),
                    Span::styled(agent.name.clone(), Style::default().fg(FG_PRIMARY)),
                ];
                if busy {
                    title.push(Span::styled(" …", Style::default().fg(BORDER_FOCUS)));
                }
                ListItem::new(vec![
                    Line::from(title),
                    Line::from(Span::styled(
                        format!("  {} → {}", agent.trigger_type, agent.return_type),
                        Style::default().fg(FG_DIM),
                    )),
                ])
            })
            .collect()
    };
    let mut state = ListState::default();
    if !app.agents.is_empty() {
        state.select(Some(app.agent_index));
    }
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(PANEL_HIGHLIGHT_BG).fg(Color::Black));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_status_bar(f: &mut Frame<'_>, app: &App, area: Rect) {
    f.render_widget(Clear, area);
    let spans = vec![
        Span::styled(
            format!("[{}]", app.focus.label()),
            Style::default().fg(BAR_TEXT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" ", Style::default()),
        Span::styled(app.status_message.as_str(), Style::default().fg(BAR_TEXT)),
    ];
    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(BAR_TEXT).bg(BAR_BG))
        .alignment(Alignment::Left);
    f.render_widget(paragraph, area);
}

fn render_overlay(f: &mut Frame<'_>, app: &App, overlay: &OverlayState) {
    match overlay {
        OverlayState::InputPrompt(state) => render_input_prompt_overlay(f, app, state),
        OverlayState::AgentForm(state) => render_agent_form_overlay(f, state),
        OverlayState::ConfirmDelete(state) => render_confirm_delete_overlay(f, state),
        OverlayState::OfficeSwitcher(state) => render_office_switcher_overlay(f, app, state),
    }
}

fn overlay_block(title: &str) -> Block<'_> {
    Block::default()
        .title(Span::styled(
            title,
            Style::default().fg(BAR_TEXT).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(MENU_BORDER))
        .style(Style::default().bg(MENU_BG))
}

fn render_input_prompt_overlay(f: &mut Frame<'_>, app: &App, state: &InputPromptState) {
    let area = centered_rect(60, 30, f.size());
    f.render_widget(Clear, area);
    let block = overlay_block(state.title.as_str());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let value = if state.value.is_empty() {
        Span::styled(state.placeholder.as_str(), Style::default().fg(FG_DIM))
    } else {
        Span::styled(state.value.as_str(), Style::default().fg(Color::White))
    };
    let mut lines = vec![
        Line::from(vec![
            Span::styled("> ", Style::default().fg(BORDER_FOCUS)),
            value,
            Span::styled("▍", Style::default().fg(BORDER_FOCUS)),
        ]),
        Line::from(""),
    ];
    // 只有附加檔案需要知道相對路徑的基準。
    if state.action == PendingInputAction::AttachFile {
        lines.push(Line::from(Span::styled(
            format!("相對於 {}", app.workspace_root.display()),
            Style::default().fg(FG_DIM),
        )));
    }
    lines.push(match state.error.as_deref() {
        Some(error) => Line::from(Span::styled(error, Style::default().fg(STATUS_ERROR))),
        None => Line::from(Span::styled(
            "Enter 確認 · Esc 取消",
            Style::default().fg(FG_DIM),
        )),
    });

    let prompt = Paragraph::new(lines)
        .style(Style::default().bg(MENU_BG))
        .wrap(Wrap { trim: false });
    f.render_widget(prompt, inner);
}

fn render_agent_form_overlay(f: &mut Frame<'_>, state: &AgentFormState) {
    let area = centered_rect(70, 60, f.size());
    f.render_widget(Clear, area);
    let block = overlay_block("New Agent");
    f.render_widget(block.clone(), area);
    let inner = block.inner(area);

    let mut lines: Vec<Line> = Vec::new();
    for field in FormField::ALL {
        let focused = field == state.field;
        let label_style = if focused {
            Style::default()
                .fg(MENU_HIGHLIGHT_TEXT)
                .bg(MENU_HIGHLIGHT_BG)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(FG_PRIMARY)
        };
        let value = state.value_of(field);
        let value_span = if field.is_choice() {
            Span::styled(format!("‹ {} ›", value), Style::default().fg(Color::White))
        } else if value.is_empty() {
            Span::styled("(empty)", Style::default().fg(FG_DIM))
        } else {
            Span::styled(value, Style::default().fg(Color::White))
        };
        let mut spans = vec![
            Span::styled(format!(" {:<13}", field.label()), label_style),
            Span::raw(" "),
            value_span,
        ];
        if focused && !field.is_choice() {
            spans.push(Span::styled(" ▍", Style::default().fg(BORDER_FOCUS)));
        }
        lines.push(Line::from(spans));
        if field == FormField::TriggerType {
            lines.push(Line::from(Span::styled(
                format!("{:>15}{}", "", state.trigger_type.description()),
                Style::default().fg(FG_DIM),
            )));
        }
        if field == FormField::ReturnType {
            lines.push(Line::from(Span::styled(
                format!("{:>15}{}", "", state.return_type.description()),
                Style::default().fg(FG_DIM),
            )));
        }
    }
    lines.push(Line::from(""));
    match &state.error {
        Some(error) => lines.push(Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(STATUS_ERROR),
        ))),
        None => lines.push(Line::from(Span::styled(
            "Tab/↑/↓ 切換欄位 · ←/→ 變更選項 · Enter 建立 · Esc 取消",
            Style::default().fg(FG_DIM),
        ))),
    }

    let form = Paragraph::new(lines)
        .style(Style::default().bg(MENU_BG))
        .wrap(Wrap { trim: false });
    f.render_widget(form, inner);
}

fn render_office_switcher_overlay(f: &mut Frame<'_>, app: &App, state: &OfficeSwitcherState) {
    let area = centered_rect(50, 60, f.size());
    f.render_widget(Clear, area);
    let block = overlay_block("Offices");
    f.render_widget(block.clone(), area);
    let inner = block.inner(area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(inner);

    let current = app.office.as_ref().map(|office| office.id.as_str());
    let items: Vec<ListItem> = if state.offices.is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "No offices",
            Style::default().fg(FG_DIM),
        )))]
    } else {
        state
            .offices
            .iter()
            .map(|office| {
                let marker = if Some(office.id.as_str()) == current {
                    "● "
                } else {
                    "  "
                };
                let mut lines = vec![Line::from(Span::styled(
                    format!("{}{}", marker, office.name),
                    Style::default().fg(FG_PRIMARY).add_modifier(Modifier::BOLD),
                ))];
                if let Some(detail) = office.description.as_ref() {
                    lines.push(Line::from(Span::styled(
                        format!("  {}", detail),
                        Style::default().fg(FG_DIM),
                    )));
                }
                ListItem::new(lines)
            })
            .collect()
    };

    let mut list_state = ListState::default();
    if !state.offices.is_empty() {
        list_state.select(Some(state.selected.min(state.offices.len() - 1)));
    }

    let list = List::new(items)
        .style(Style::default().bg(MENU_BG))
        .highlight_style(
            Style::default()
                .bg(MENU_HIGHLIGHT_BG)
                .fg(MENU_HIGHLIGHT_TEXT),
        );
    f.render_stateful_widget(list, chunks[0], &mut list_state);

    let instructions = Paragraph::new(Line::from(vec![Span::styled(
        "上/下鍵選擇，Enter 開啟，n 新增，d 刪除，Esc 取消",
        Style::default().fg(FG_DIM),
    )]))
    .style(Style::default().bg(MENU_BG))
    .alignment(Alignment::Center);
    f.render_widget(instructions, chunks[1]);
}

fn render_confirm_delete_overlay(f: &mut Frame<'_>, state: &ConfirmDeleteState) {
    let area = centered_rect(50, 28, f.size());
    f.render_widget(Clear, area);
    let block = overlay_block("確認刪除");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let consequence = match state.target {
        DeleteTarget::Office(_) => "所有部門與代理也會一併刪除。",
        DeleteTarget::Department(_) => "部門內的代理也會一併刪除。",
        DeleteTarget::Agent(_) => "此動作無法復原。",
    };
    let choice = |label: &'static str, selected: bool| {
        let style = if selected {
            Style::default()
                .fg(Color::Black)
                .bg(PANEL_HIGHLIGHT_BG)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(BAR_TEXT)
        };
        Span::styled(label, style)
    };

    let lines = vec![
        Line::from(Span::styled(
            format!("Delete {}?", state.display),
            Style::default().fg(Color::White),
        )),
        Line::from(Span::styled(consequence, Style::default().fg(FG_DIM))),
        Line::from(""),
        Line::from(vec![
            choice(" [刪除] ", state.confirm_selected()),
            Span::raw("   "),
            choice(" [取消] ", !state.confirm_selected()),
        ])
        .alignment(Alignment::Center),
        Line::from(Span::styled(
            "←/→ 選擇 · Enter 確認 · Esc 取消",
            Style::default().fg(FG_DIM),
        )),
    ];
    let dialog = Paragraph::new(lines)
        .style(Style::default().bg(MENU_BG))
        .wrap(Wrap { trim: false });
    f.render_widget(dialog, inner);
}

fn push_wrapped_line(lines: &mut Vec<Line>, text: &str, style: Style, width: usize) {
    for raw in text.split('\n') {
        for segment in wrap_to_width(raw, width) {
            lines.push(Line::from(Span::styled(segment, style)));
        }
    }
}

fn wrap_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }
    if text.is_empty() {
        return vec![String::new()];
    }
    let mut result = Vec::new();
    let mut current = String::new();
    let mut current_width = 0usize;
    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(1).max(1);
        if current_width + ch_width > width && !current.is_empty() {
            result.push(current);
            current = String::new();
            current_width = 0;
        }
        current.push(ch);
        current_width += ch_width;
    }
    result.push(current);
    result
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1])[1]
}

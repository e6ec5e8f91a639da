use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{info, warn};

use super::{App, PendingInputAction};
use crate::agent::{FileRef, InputSurface};
use crate::definitions::FocusArea;

// Key handling and actions for the agent card pane.
impl App {
    pub(crate) fn handle_card_key(&mut self, key: KeyEvent) {
        let Some(card) = self.selected_card() else {
            if key.code == KeyCode::Esc {
                self.focus = FocusArea::Agents;
            }
            return;
        };
        let input = card.layout().input;
        let in_flight = card.interaction.in_flight();
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match (key.code, ctrl) {
            (KeyCode::Esc, _) => self.focus = FocusArea::Agents,
            (KeyCode::Char('e'), true) => {
                self.with_selected_card(|card| card.expanded = !card.expanded)
            }
            (KeyCode::Char('l'), true) => {
                self.with_selected_card(|card| card.show_all = !card.show_all)
            }
            (KeyCode::Char('o'), true) if input == InputSurface::UploadDrop => {
                self.prompt_input(
                    PendingInputAction::AttachFile,
                    "Attach File",
                    "Path of the file to upload (relative to workspace)",
                );
            }
            (KeyCode::Char('x'), true) if input == InputSurface::UploadDrop => {
                self.with_selected_card(|card| card.interaction.attachment_draft = None);
                self.status_message = String::from("Attachment cleared");
            }
            _ if input == InputSurface::ChatBox && is_newline_key(&key) => {
                if !in_flight {
                    self.with_selected_card(|card| card.interaction.input_draft.insert_newline());
                }
            }
            (KeyCode::Enter, _) => self.trigger_selected_card(),
            _ if input == InputSurface::ChatBox && !in_flight => self.edit_draft(key),
            _ => {}
        }
    }

    fn edit_draft(&mut self, key: KeyEvent) {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return;
        }
        self.with_selected_card(|card| {
            let draft = &mut card.interaction.input_draft;
            match key.code {
                KeyCode::Char(ch) => draft.insert_char(ch),
                KeyCode::Backspace => draft.backspace(),
                KeyCode::Delete => draft.delete(),
                KeyCode::Left => draft.move_left(),
                KeyCode::Right => draft.move_right(),
                KeyCode::Home => draft.move_to_line_start(),
                KeyCode::End => draft.move_to_line_end(),
                _ => {}
            }
        });
    }

    fn with_selected_card(&mut self, f: impl FnOnce(&mut crate::panels::AgentCard)) {
        let Some(agent_id) = self.selected_agent().map(|agent| agent.id.clone()) else {
            return;
        };
        if let Some(card) = self.cards.get_mut(&agent_id) {
            f(card);
        }
    }

    /// Hands the selected card's trigger to the runner. Rejections only
    /// change the status line.
    pub(crate) fn trigger_selected_card(&mut self) {
        let Some(agent_id) = self.selected_agent().map(|agent| agent.id.clone()) else {
            return;
        };
        let Some(card) = self.cards.get_mut(&agent_id) else {
            return;
        };
        match card.trigger(&self.runner) {
            Ok(()) => {
                self.status_message = format!("Triggering {}...", card.agent.name);
            }
            Err(err) => {
                self.status_message = format!("{}: {}", card.agent.name, err);
            }
        }
    }

    /// Stages a file on the selected card; the path is relative to the workspace.
    pub(crate) fn attach_file(&mut self, input: &str) -> Result<(), String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(String::from("Path cannot be empty"));
        }
        let path = Path::new(trimmed);
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        };
        let file = FileRef::from_path(&path).map_err(|err| {
            warn!("Cannot attach {}: {}", path.display(), err);
            format!("Cannot attach {}: {}", path.display(), err)
        })?;
        let summary = format!("Attached {} ({})", file.name, file.size_label());
        info!("{}", summary);
        let mut attached = false;
        self.with_selected_card(|card| {
            card.interaction.attachment_draft = Some(file);
            attached = true;
        });
        if !attached {
            return Err(String::from("No agent card is open"));
        }
        self.status_message = summary;
        Ok(())
    }
}

/// Shift+Enter 需要終端機回報修飾鍵；Alt+Enter 與 Ctrl+J 在一般終端機也能用。
fn is_newline_key(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Enter => key
            .modifiers
            .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT),
        KeyCode::Char('j') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

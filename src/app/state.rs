//! Defines the core state structures for the application.
//!
//! This module contains the central `App` struct that holds the state of the
//! office dashboard, plus the overlay states used for prompts, the agent form,
//! delete confirmation and the office switcher.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::agent::{Agent, ReturnType, TriggerRunner, TriggerType};
use crate::config::Settings;
use crate::definitions::{FocusArea, FormField};
use crate::panels::AgentCard;
use crate::store::{DepartmentSummary, Identity, NewAgent, Office, OfficeStore};

/// The main application state.
///
/// This struct is the single source of truth for what is rendered and for how
/// key presses are interpreted.
pub struct App {
    // --- Core State ---
    /// Flag to indicate if the application should quit.
    pub should_quit: bool,
    /// The currently focused UI area.
    pub focus: FocusArea,
    /// The message currently displayed in the status bar.
    pub status_message: String,
    /// The root directory of the current workspace.
    pub workspace_root: PathBuf,
    pub settings: Settings,
    pub identity: Identity,
    pub store: OfficeStore,

    // --- Office View ---
    /// The office whose departments are shown.
    pub office: Option<Office>,
    pub departments: Vec<DepartmentSummary>,
    pub department_index: usize,
    /// Agents of the selected department, newest first.
    pub agents: Vec<Agent>,
    pub agent_index: usize,
    /// Mounted cards of the selected department, keyed by agent id.
    pub cards: HashMap<String, AgentCard>,
    /// The currently active overlay, if any.
    pub overlay: Option<OverlayState>,

    // --- Internal State ---
    pub(crate) runner: TriggerRunner,
    pub(crate) next_card_id: u64,
    /// The configured tick rate for the application.
    pub(crate) tick_rate: Duration,
}

/// Represents the state of any active overlay panel.
#[derive(Debug, Clone)]
pub enum OverlayState {
    InputPrompt(InputPromptState),
    AgentForm(AgentFormState),
    ConfirmDelete(ConfirmDeleteState),
    OfficeSwitcher(OfficeSwitcherState),
}

/// An enumeration of actions that require further user input via a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingInputAction {
    NewOffice,
    NewDepartment,
    AttachFile,
}

/// State for the single-line input prompt overlay.
#[derive(Debug, Clone)]
pub struct InputPromptState {
    /// The title displayed at the top of the prompt.
    pub title: String,
    /// The current value entered by the user.
    pub value: String,
    /// Placeholder text to display when the input is empty.
    pub placeholder: String,
    /// The action that will be performed upon confirmation.
    pub action: PendingInputAction,
    /// An optional error message to display.
    pub error: Option<String>,
}

impl InputPromptState {
    pub fn new(
        title: impl Into<String>,
        placeholder: impl Into<String>,
        action: PendingInputAction,
    ) -> Self {
        Self {
            title: title.into(),
            value: String::new(),
            placeholder: placeholder.into(),
            action,
            error: None,
        }
    }
}

/// State for the agent creation form.
#[derive(Debug, Clone)]
pub struct AgentFormState {
    pub department_id: String,
    pub name: String,
    pub description: String,
    pub trigger_type: TriggerType,
    pub return_type: ReturnType,
    pub webhook_url: String,
    pub workflow_url: String,
    /// The field receiving input.
    pub field: FormField,
    pub error: Option<String>,
}

impl AgentFormState {
    pub fn new(department_id: impl Into<String>) -> Self {
        Self {
            department_id: department_id.into(),
            name: String::new(),
            description: String::new(),
            trigger_type: TriggerType::Click,
            return_type: ReturnType::Text,
            webhook_url: String::new(),
            workflow_url: String::new(),
            field: FormField::Name,
            error: None,
        }
    }

    /// The text buffer behind the focused field; `None` for choice fields.
    pub fn text_mut(&mut self) -> Option<&mut String> {
        match self.field {
            FormField::Name => Some(&mut self.name),
            FormField::Description => Some(&mut self.description),
            FormField::WebhookUrl => Some(&mut self.webhook_url),
            FormField::WorkflowUrl => Some(&mut self.workflow_url),
            FormField::TriggerType | FormField::ReturnType => None,
        }
    }

    pub fn value_of(&self, field: FormField) -> String {
        match field {
            FormField::Name => self.name.clone(),
            FormField::Description => self.description.clone(),
            FormField::TriggerType => self.trigger_type.to_string(),
            FormField::ReturnType => self.return_type.to_string(),
            FormField::WebhookUrl => self.webhook_url.clone(),
            FormField::WorkflowUrl => self.workflow_url.clone(),
        }
    }

    /// Cycles the focused choice field.
    pub fn cycle(&mut self, delta: isize) {
        match self.field {
            FormField::TriggerType => self.trigger_type = self.trigger_type.cycle(delta),
            FormField::ReturnType => self.return_type = self.return_type.cycle(delta),
            _ => {}
        }
    }

    pub fn to_new_agent(&self) -> NewAgent {
        NewAgent {
            name: self.name.clone(),
            description: Some(self.description.clone()),
            trigger_type: self.trigger_type,
            return_type: self.return_type,
            webhook_url: self.webhook_url.clone(),
            workflow_url: Some(self.workflow_url.clone()),
            department_id: self.department_id.clone(),
        }
    }
}

/// What a confirmed delete removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Office(String),
    Department(String),
    Agent(String),
}

/// State for the "confirm delete" overlay.
#[derive(Debug, Clone)]
pub struct ConfirmDeleteState {
    pub target: DeleteTarget,
    /// The string representation of the target to display to the user.
    pub display: String,
    /// The index of the selected button (0 for Confirm, 1 for Cancel).
    pub selected_index: usize,
}

impl ConfirmDeleteState {
    pub fn new(target: DeleteTarget, display: String) -> Self {
        Self {
            target,
            display,
            selected_index: 1,
        }
    }

    /// Toggles the selection between the "Confirm" and "Cancel" buttons.
    pub fn toggle_selection(&mut self) {
        self.selected_index = (self.selected_index + 1) % 2;
    }

    /// Sets the selection to a specific index.
    pub fn select(&mut self, index: usize) {
        self.selected_index = index.min(1);
    }

    /// Returns true if the "Confirm" button is currently selected.
    pub fn confirm_selected(&self) -> bool {
        self.selected_index == 0
    }
}

/// State for the office switcher overlay.
#[derive(Debug, Clone)]
pub struct OfficeSwitcherState {
    pub offices: Vec<Office>,
    /// The index of the currently selected office.
    pub selected: usize,
}

impl OfficeSwitcherState {
    pub fn new(offices: Vec<Office>, selected: usize) -> Self {
        let mut state = Self {
            offices,
            selected: 0,
        };
        if !state.offices.is_empty() {
            state.selected = selected.min(state.offices.len() - 1);
        }
        state
    }

    /// Moves the selection up or down in the list.
    pub fn move_selection(&mut self, delta: isize) {
        if self.offices.is_empty() {
            self.selected = 0;
            return;
        }
        let last = self.offices.len() as isize - 1;
        self.selected = (self.selected as isize + delta).clamp(0, last) as usize;
    }

    pub fn selected_office(&self) -> Option<&Office> {
        self.offices.get(self.selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_cycles_only_choice_fields() {
        let mut form = AgentFormState::new("dept");
        form.cycle(1);
        assert_eq!(form.trigger_type, TriggerType::Click);

        form.field = FormField::TriggerType;
        form.cycle(1);
        assert_eq!(form.trigger_type, TriggerType::Chat);
        assert!(form.text_mut().is_none());

        form.field = FormField::Name;
        form.text_mut().unwrap().push_str("Helper");
        assert_eq!(form.to_new_agent().name, "Helper");
    }

    #[test]
    fn delete_confirmation_defaults_to_cancel() {
        let state = ConfirmDeleteState::new(DeleteTarget::Agent(String::from("a")), String::from("a"));
        assert!(!state.confirm_selected());
    }
}

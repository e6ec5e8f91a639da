use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, info, warn};

use super::{
    AgentFormState, App, ConfirmDeleteState, DeleteTarget, InputPromptState, OfficeSwitcherState,
    OverlayState, PendingInputAction,
};
use crate::store::{NewDepartment, NewOffice};

// Implementation block for overlay-related logic in the App.
impl App {
    /// Opens a single-line input prompt for `action`.
    pub(crate) fn prompt_input(&mut self, action: PendingInputAction, title: &str, placeholder: &str) {
        debug!("Showing input prompt: {}", title);
        self.overlay = Some(OverlayState::InputPrompt(InputPromptState::new(
            title,
            placeholder,
            action,
        )));
        self.status_message = format!("{}: waiting for input", title);
    }

    pub(crate) fn open_agent_form(&mut self) {
        let Some(department) = self.selected_department() else {
            self.status_message = String::from("Create a department first");
            return;
        };
        let form = AgentFormState::new(department.id.clone());
        self.overlay = Some(OverlayState::AgentForm(form));
        self.status_message = String::from("New agent: Tab moves between fields, ←/→ changes choices");
    }

    pub(crate) fn confirm_delete(&mut self, target: DeleteTarget, display: String) {
        self.status_message = format!("Delete {}?", display);
        self.overlay = Some(OverlayState::ConfirmDelete(ConfirmDeleteState::new(
            target, display,
        )));
    }

    pub(crate) fn open_office_switcher(&mut self) {
        let offices: Vec<_> = self.store.offices().into_iter().cloned().collect();
        let current = self
            .office
            .as_ref()
            .and_then(|office| offices.iter().position(|o| o.id == office.id))
            .unwrap_or(0);
        self.overlay = Some(OverlayState::OfficeSwitcher(OfficeSwitcherState::new(
            offices, current,
        )));
        self.status_message = String::from("Offices: Enter to open, n to create, d to delete");
        info!("Opened office switcher");
    }

    /// Handles key events when any overlay is active.
    pub(crate) fn handle_overlay_key(&mut self, key: KeyEvent) {
        // Take the overlay out so the handlers can borrow `self` freely.
        if let Some(overlay) = self.overlay.take() {
            match overlay {
                OverlayState::InputPrompt(state) => self.handle_input_prompt_key(key, state),
                OverlayState::AgentForm(state) => self.handle_agent_form_key(key, state),
                OverlayState::ConfirmDelete(state) => self.handle_confirm_delete_key(key, state),
                OverlayState::OfficeSwitcher(state) => self.handle_office_switcher_key(key, state),
            }
        }
    }

    fn handle_input_prompt_key(&mut self, key: KeyEvent, mut state: InputPromptState) {
        match key.code {
            KeyCode::Esc => return,
            KeyCode::Enter => {
                match self.execute_pending_input(state.action, &state.value) {
                    Ok(()) => info!("Completed input action {:?}", state.action),
                    Err(message) => {
                        warn!("Input prompt action failed: {}", message);
                        self.status_message = message.clone();
                        state.error = Some(message);
                        self.overlay = Some(OverlayState::InputPrompt(state));
                    }
                }
                return;
            }
            KeyCode::Backspace => {
                state.value.pop();
                state.error = None;
            }
            KeyCode::Char(ch) if !has_command_modifier(&key) => {
                state.value.push(ch);
                state.error = None;
            }
            _ => {}
        }
        self.overlay = Some(OverlayState::InputPrompt(state));
    }

    fn execute_pending_input(&mut self, action: PendingInputAction, input: &str) -> Result<(), String> {
        match action {
            PendingInputAction::NewOffice => {
                let office = self
                    .store
                    .create_office(NewOffice {
                        name: input.to_string(),
                        description: None,
                        owner_id: self.identity.user_id.clone(),
                    })
                    .map_err(|err| err.to_string())?;
                self.switch_office(&office.id);
                Ok(())
            }
            PendingInputAction::NewDepartment => {
                let Some(office) = &self.office else {
                    return Err(String::from("No office is open"));
                };
                let department = self
                    .store
                    .create_department(NewDepartment {
                        name: input.to_string(),
                        office_id: office.id.clone(),
                        position: None,
                    })
                    .map_err(|err| err.to_string())?;
                self.refresh_departments();
                if let Some(index) = self
                    .departments
                    .iter()
                    .position(|summary| summary.department.id == department.id)
                {
                    self.department_index = index;
                    self.agent_index = 0;
                    self.unmount_cards();
                    self.refresh_agents();
                }
                self.status_message = format!("Created department {}", department.name);
                Ok(())
            }
            PendingInputAction::AttachFile => self.attach_file(input),
        }
    }

    fn handle_agent_form_key(&mut self, key: KeyEvent, mut form: AgentFormState) {
        match key.code {
            KeyCode::Esc => {
                self.status_message = String::from("Agent creation cancelled");
                return;
            }
            KeyCode::Enter => {
                match self.store.create_agent(form.to_new_agent()) {
                    Ok(agent) => {
                        self.status_message = format!("Created agent {}", agent.name);
                        self.refresh_departments();
                        if let Some(index) = self.agents.iter().position(|a| a.id == agent.id) {
                            self.agent_index = index;
                        }
                    }
                    Err(err) => {
                        form.error = Some(err.to_string());
                        self.overlay = Some(OverlayState::AgentForm(form));
                    }
                }
                return;
            }
            KeyCode::Tab | KeyCode::Down => form.field = form.field.step(1),
            KeyCode::BackTab | KeyCode::Up => form.field = form.field.step(-1),
            KeyCode::Left if form.field.is_choice() => form.cycle(-1),
            KeyCode::Right if form.field.is_choice() => form.cycle(1),
            KeyCode::Backspace => {
                if let Some(text) = form.text_mut() {
                    text.pop();
                }
                form.error = None;
            }
            KeyCode::Char(ch) if !has_command_modifier(&key) => {
                if let Some(text) = form.text_mut() {
                    text.push(ch);
                }
                form.error = None;
            }
            _ => {}
        }
        self.overlay = Some(OverlayState::AgentForm(form));
    }

    fn handle_confirm_delete_key(&mut self, key: KeyEvent, mut state: ConfirmDeleteState) {
        match key.code {
            KeyCode::Esc => {
                self.status_message = format!("Deletion cancelled: {}", state.display);
                return;
            }
            KeyCode::Left | KeyCode::Up => state.select(0),
            KeyCode::Right | KeyCode::Down => state.select(1),
            KeyCode::Tab | KeyCode::BackTab => state.toggle_selection(),
            KeyCode::Enter => {
                if state.confirm_selected() {
                    self.finalize_delete(&state.target, &state.display);
                } else {
                    self.status_message = format!("Deletion cancelled: {}", state.display);
                }
                return;
            }
            _ => {}
        }
        self.overlay = Some(OverlayState::ConfirmDelete(state));
    }

    fn finalize_delete(&mut self, target: &DeleteTarget, display: &str) {
        let result = match target {
            DeleteTarget::Office(id) => self.store.delete_office(id).map(|_| ()),
            DeleteTarget::Department(id) => self.store.delete_department(id).map(|_| ()),
            DeleteTarget::Agent(id) => self.store.delete_agent(id).map(|_| ()),
        };
        if let Err(err) = result {
            warn!("Failed to delete {}: {}", display, err);
            self.status_message = format!("Failed to delete {}: {}", display, err);
            return;
        }
        match target {
            DeleteTarget::Office(id) => {
                if self.office.as_ref().is_some_and(|office| &office.id == id) {
                    self.load_office();
                }
            }
            DeleteTarget::Department(_) | DeleteTarget::Agent(_) => self.refresh_departments(),
        }
        self.status_message = format!("Deleted {}", display);
    }

    fn handle_office_switcher_key(&mut self, key: KeyEvent, mut state: OfficeSwitcherState) {
        match key.code {
            KeyCode::Esc => return,
            KeyCode::Up | KeyCode::BackTab => state.move_selection(-1),
            KeyCode::Down | KeyCode::Tab => state.move_selection(1),
            KeyCode::PageUp => state.move_selection(-5),
            KeyCode::PageDown => state.move_selection(5),
            KeyCode::Enter => {
                if let Some(office) = state.selected_office() {
                    let id = office.id.clone();
                    self.switch_office(&id);
                }
                return;
            }
            KeyCode::Char('n') => {
                self.prompt_input(PendingInputAction::NewOffice, "New Office", "Office name");
                return;
            }
            KeyCode::Char('d') => {
                if let Some(office) = state.selected_office() {
                    let target = DeleteTarget::Office(office.id.clone());
                    let display = format!("office {}", office.name);
                    self.confirm_delete(target, display);
                }
                return;
            }
            _ => {}
        }
        if let Some(office) = state.selected_office() {
            self.status_message = format!("Office: {}", office.name);
        }
        self.overlay = Some(OverlayState::OfficeSwitcher(state));
    }
}

fn has_command_modifier(key: &KeyEvent) -> bool {
    key.modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

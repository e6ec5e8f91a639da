use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::{App, DeleteTarget, FocusArea, PendingInputAction};

impl App {
    /// The main entry point for handling keyboard events.
    ///
    /// This function acts as a router, dispatching the key event to the appropriate
    /// handler based on the application's current state.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        // Overlays capture all input.
        if self.overlay.is_some() {
            self.handle_overlay_key(key);
            return;
        }

        // Global shortcuts are handled next.
        if self.handle_global_shortcuts(key) {
            return;
        }

        // If no global shortcuts were matched, pass the key to the focused pane.
        match self.focus {
            FocusArea::Departments => self.handle_departments_key(key),
            FocusArea::Agents => self.handle_agents_key(key),
            FocusArea::Card => self.handle_card_key(key),
        }
    }

    /// Handles global keyboard shortcuts.
    /// Returns `true` if a shortcut was handled, `false` otherwise.
    fn handle_global_shortcuts(&mut self, key: KeyEvent) -> bool {
        match (key.code, key.modifiers) {
            (KeyCode::Char('q'), m) if m.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            (KeyCode::Tab, _) => self.set_focus(self.focus.next()),
            (KeyCode::BackTab, _) => self.set_focus(self.focus.previous()),
            (KeyCode::F(2), _) => self.open_office_switcher(),
            _ => return false,
        }
        true
    }

    fn set_focus(&mut self, focus: FocusArea) {
        self.focus = focus;
        self.status_message = format!("Focus: {}", focus.label());
    }

    fn handle_departments_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.move_department_selection(-1),
            KeyCode::Down => self.move_department_selection(1),
            KeyCode::PageUp => self.move_department_selection(-5),
            KeyCode::PageDown => self.move_department_selection(5),
            KeyCode::Enter | KeyCode::Right => self.set_focus(FocusArea::Agents),
            KeyCode::Char('n') => self.prompt_input(
                PendingInputAction::NewDepartment,
                "New Department",
                "Department name",
            ),
            KeyCode::Char('d') => {
                if let Some(department) = self.selected_department() {
                    let target = DeleteTarget::Department(department.id.clone());
                    let display = format!("department {}", department.name);
                    self.confirm_delete(target, display);
                }
            }
            _ => {}
        }
    }

    fn handle_agents_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.move_agent_selection(-1),
            KeyCode::Down => self.move_agent_selection(1),
            KeyCode::PageUp => self.move_agent_selection(-5),
            KeyCode::PageDown => self.move_agent_selection(5),
            KeyCode::Left | KeyCode::Esc => self.set_focus(FocusArea::Departments),
            KeyCode::Enter | KeyCode::Right => {
                if self.selected_agent().is_some() {
                    self.set_focus(FocusArea::Card);
                }
            }
            KeyCode::Char('n') => self.open_agent_form(),
            KeyCode::Char('a') => self.toggle_selected_agent(),
            KeyCode::Char('d') => {
                if let Some(agent) = self.selected_agent() {
                    let target = DeleteTarget::Agent(agent.id.clone());
                    let display = format!("agent {}", agent.name);
                    self.confirm_delete(target, display);
                }
            }
            _ => {}
        }
    }
}

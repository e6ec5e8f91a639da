use log::{debug, info, warn};

use super::App;
use crate::agent::{Agent, CardId};
use crate::panels::AgentCard;
use crate::store::{AgentPatch, Department};

// Office, department and agent selection, and the card mounts that follow it.
impl App {
    /// Opens the remembered office, creating the default one if needed.
    pub(crate) fn load_office(&mut self) {
        match self.store.ensure_office(&self.identity) {
            Ok(office) => {
                info!("Opened office {}", office.name);
                self.office = Some(office);
            }
            Err(err) => {
                warn!("Failed to open an office: {}", err);
                self.status_message = format!("Failed to open office: {}", err);
                self.office = None;
            }
        }
        self.department_index = 0;
        self.unmount_cards();
        self.refresh_departments();
    }

    pub(crate) fn switch_office(&mut self, office_id: &str) {
        if let Err(err) = self.store.select_office(office_id) {
            self.status_message = format!("Failed to switch office: {}", err);
            return;
        }
        self.load_office();
        if let Some(office) = &self.office {
            self.status_message = format!("Switched to {}", office.name);
        }
    }

    /// Re-reads department summaries for the current office, keeping the selection.
    pub(crate) fn refresh_departments(&mut self) {
        self.departments = match &self.office {
            Some(office) => self.store.department_summaries(&office.id),
            None => Vec::new(),
        };
        self.department_index = clamp_index(self.department_index, self.departments.len());
        self.refresh_agents();
    }

    /// Re-reads the agents of the selected department and syncs the mounted cards.
    pub(crate) fn refresh_agents(&mut self) {
        self.agents = match self.selected_department() {
            Some(department) => self
                .store
                .agents(&department.id)
                .into_iter()
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        self.agent_index = clamp_index(self.agent_index, self.agents.len());

        let agents = &self.agents;
        self.cards.retain(|agent_id, card| {
            let keep = agents.iter().any(|agent| &agent.id == agent_id);
            if !keep {
                debug!("Unmounted card {:?} for agent {}", card.id(), agent_id);
            }
            keep
        });
        for agent in &self.agents {
            match self.cards.get_mut(&agent.id) {
                Some(card) => card.agent = agent.clone(),
                None => {
                    self.next_card_id += 1;
                    let card = AgentCard::new(CardId(self.next_card_id), agent.clone());
                    self.cards.insert(agent.id.clone(), card);
                }
            }
        }
    }

    /// Drops every mounted card; late results for them are discarded.
    pub(crate) fn unmount_cards(&mut self) {
        if !self.cards.is_empty() {
            debug!("Unmounting {} cards", self.cards.len());
        }
        self.cards.clear();
    }

    pub fn selected_department(&self) -> Option<&Department> {
        self.departments
            .get(self.department_index)
            .map(|summary| &summary.department)
    }

    pub fn selected_agent(&self) -> Option<&Agent> {
        self.agents.get(self.agent_index)
    }

    pub fn selected_card(&self) -> Option<&AgentCard> {
        self.selected_agent()
            .and_then(|agent| self.cards.get(&agent.id))
    }

    pub(crate) fn move_department_selection(&mut self, delta: isize) {
        let next = step_index(self.department_index, delta, self.departments.len());
        if next == self.department_index {
            return;
        }
        self.department_index = next;
        self.agent_index = 0;
        self.unmount_cards();
        self.refresh_agents();
        if let Some(department) = self.selected_department() {
            self.status_message = format!("Department: {}", department.name);
        }
    }

    pub(crate) fn move_agent_selection(&mut self, delta: isize) {
        self.agent_index = step_index(self.agent_index, delta, self.agents.len());
    }

    /// Flips the selected agent's active flag through the store.
    pub(crate) fn toggle_selected_agent(&mut self) {
        let Some(agent) = self.selected_agent() else {
            return;
        };
        let (id, next) = (agent.id.clone(), !agent.is_active);
        match self.store.update_agent(&id, AgentPatch::active(next)) {
            Ok(agent) => {
                self.status_message = format!(
                    "{} is now {}",
                    agent.name,
                    if agent.is_active { "active" } else { "inactive" }
                );
                self.refresh_departments();
            }
            Err(err) => {
                warn!("Failed to toggle agent {}: {}", id, err);
                self.status_message = format!("Failed to update agent: {}", err);
            }
        }
    }
}

fn clamp_index(index: usize, len: usize) -> usize {
    if len == 0 { 0 } else { index.min(len - 1) }
}

fn step_index(index: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (index as isize + delta).clamp(0, len as isize - 1) as usize
}

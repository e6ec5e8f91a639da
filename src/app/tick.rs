use log::debug;

use super::App;

// Implementation block for tick-related logic in the App.
impl App {
    /// Called on every tick of the application loop.
    ///
    /// Applies the results of finished dispatches to their cards. Results for
    /// cards that are no longer mounted are dropped.
    pub fn on_tick(&mut self) {
        while let Some(completion) = self.runner.poll() {
            let Some(card) = self
                .cards
                .values_mut()
                .find(|card| card.id() == completion.card)
            else {
                debug!(
                    "Dropping result #{} for unmounted card {:?}",
                    completion.seq, completion.card
                );
                continue;
            };
            let succeeded = completion.outcome.is_success();
            if !card.apply(completion) {
                continue;
            }
            self.status_message = if succeeded {
                format!("{}: response received", card.agent.name)
            } else {
                format!(
                    "{}: {}",
                    card.agent.name,
                    card.interaction.last_error().unwrap_or_default()
                )
            };
        }
    }

    pub fn tick_rate(&self) -> std::time::Duration {
        self.tick_rate
    }

    /// Whether any mounted card is waiting on a dispatch.
    pub fn has_pending(&self) -> bool {
        self.cards.values().any(|card| card.interaction.in_flight())
    }
}

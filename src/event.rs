use crossterm::event::{Event as CrosstermEvent, KeyEvent};

/// Application events.
#[derive(Debug)]
pub enum Event {
    /// A tick event, sent at a regular interval. Finished dispatches are applied here.
    Tick,
    /// A key press event.
    Key(KeyEvent),
    /// The terminal was resized; the next draw picks up the new size.
    Resize,
}

impl Event {
    /// Maps a terminal event to an application event; `None` for events the app ignores.
    pub fn from_terminal(event: CrosstermEvent) -> Option<Self> {
        match event {
            CrosstermEvent::Key(key) => Some(Event::Key(key)),
            CrosstermEvent::Resize(_, _) => Some(Event::Resize),
            _ => None,
        }
    }
}

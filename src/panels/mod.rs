pub mod card;

pub use card::{AgentCard, TranscriptLine};

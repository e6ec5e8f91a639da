use super::model::TriggerType;

/// Reasons a trigger is refused before anything reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Agent is inactive")]
    Inactive,
    #[error("Agent has no manual trigger ({0})")]
    NoManualTrigger(TriggerType),
    #[error("A request is already in flight")]
    InFlight,
    #[error("Message cannot be empty")]
    EmptyMessage,
    #[error("No file selected")]
    MissingAttachment,
    #[error("Input does not match the {0} trigger")]
    ModalityMismatch(TriggerType),
}

/// Failures of a dispatch attempt that was actually issued.
///
/// All of them are local to one agent card and recoverable by triggering again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// Transport-level failure; carries the transport's own description.
    #[error("{0}")]
    Network(String),
    /// A non-2xx status was returned. The body is never read in this case.
    #[error("Webhook request failed: {status}{}", reason_suffix(.status_text))]
    Http { status: u16, status_text: String },
    /// The body was declared `application/json` but did not parse.
    #[error("Failed to decode webhook response: {0}")]
    Decode(String),
    /// The payload builder refused the input; nothing was sent.
    #[error(transparent)]
    Rejected(#[from] ValidationError),
}

impl From<reqwest::Error> for DispatchError {
    fn from(err: reqwest::Error) -> Self {
        DispatchError::Network(err.to_string())
    }
}

/// Unregistered status codes have no reason phrase; leave it out rather than
/// printing a trailing space.
fn reason_suffix(status_text: &str) -> String {
    let reason = status_text.trim();
    if reason.is_empty() {
        String::new()
    } else {
        format!(" {}", reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_mentions_status_and_reason() {
        let err = DispatchError::Http {
            status: 500,
            status_text: String::from("Internal Server Error"),
        };
        assert_eq!(
            err.to_string(),
            "Webhook request failed: 500 Internal Server Error"
        );
    }

    #[test]
    fn http_error_without_reason_has_no_trailing_space() {
        let err = DispatchError::Http {
            status: 599,
            status_text: String::new(),
        };
        assert_eq!(err.to_string(), "Webhook request failed: 599");
    }
}

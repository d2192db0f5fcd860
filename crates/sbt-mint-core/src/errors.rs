use crate::ports::ProviderError;

/// Ordered: the first key found in the error text wins.
pub const ERROR_MESSAGES: &[(&str, &str)] = &[
    ("user rejected", "Transaction cancelled by user"),
    ("insufficient funds", "Insufficient ETH balance"),
    ("already minted", "You have already minted"),
    ("network", "Network error - please try again"),
];

pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Turn a raw provider error into the line shown to the user.
///
/// Matches against the reason when it is non-empty, otherwise the message,
/// case-insensitively. Falls back to the raw text, then [`UNKNOWN_ERROR`].
pub fn parse_error(err: &ProviderError) -> String {
    let raw = non_empty(err.reason.as_deref()).or(non_empty(err.message.as_deref()));
    let lowered = raw.unwrap_or_default().to_lowercase();
    ERROR_MESSAGES
        .iter()
        .find(|(key, _)| lowered.contains(key))
        .map(|(_, friendly)| (*friendly).to_owned())
        .unwrap_or_else(|| raw.unwrap_or(UNKNOWN_ERROR).to_owned())
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

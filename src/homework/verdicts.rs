//! Review status to verdict text mapping.

/// Every status the bot understands, with the text sent to the user.
pub const HOMEWORK_VERDICTS: [(&str, &str); 3] = [
    ("approved", "Работа проверена: ревьюеру всё понравилось. Ура!"),
    ("reviewing", "Работа взята на проверку ревьюером."),
    ("rejected", "Работа проверена: у ревьюера есть замечания."),
];

/// Looks up the verdict text for a review status.
#[must_use]
pub fn verdict_for(status: &str) -> Option<&'static str> {
    HOMEWORK_VERDICTS
        .iter()
        .find(|(code, _)| *code == status)
        .map(|(_, verdict)| *verdict)
}

/// Checks whether a status is one of the known verdict keys.
#[must_use]
pub fn is_known_status(status: &str) -> bool {
    verdict_for(status).is_some()
}

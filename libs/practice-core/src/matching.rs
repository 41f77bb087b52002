//! Answer matching for typed drill answers.
//!
//! An accepted answer may list several alternatives separated by commas.
//! A response matches when, after trimming and lower-casing, it equals one
//! of the alternatives exactly.

/// Separator between alternatives in an accepted answer.
pub const ANSWER_DELIMITER: char = ',';

/// Check a typed response against an accepted answer.
pub fn matches(user_input: &str, accepted_answer: &str) -> bool {
    let typed = normalize(user_input);
    if typed.is_empty() {
        return false;
    }

    accepted_answer
        .split(ANSWER_DELIMITER)
        .map(normalize)
        .any(|candidate| candidate == typed)
}

/// The alternatives of an accepted answer as written, for display.
pub fn accepted_answers(accepted_answer: &str) -> Vec<String> {
    accepted_answer
        .split(ANSWER_DELIMITER)
        .map(str::trim)
        .filter(|candidate| !candidate.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trim and case-fold without regard to locale.
fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

use std::io::{self, BufRead, Write};

/// Answers the yes/no questions that gate each stage.
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> bool;
}

/// Empty input, `y` and `yes` mean yes. Anything else means no.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "" | "y" | "yes")
}

/// Asks on stdout and reads the answer from stdin.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, question: &str) -> bool {
        print!("{} [Y/n]: ", question);
        let _ = io::stdout().flush();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            // EOF falls through as an empty answer.
            Ok(_) => is_affirmative(&line),
            Err(err) => {
                tracing::warn!("failed to read answer: {}", err);
                false
            }
        }
    }
}

/// Accepts every prompt without asking.
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, question: &str) -> bool {
        tracing::debug!("auto-confirmed: {}", question);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_answer_is_yes() {
        assert!(is_affirmative(""));
        assert!(is_affirmative("\n"));
        assert!(is_affirmative("  \r\n"));
    }

    #[test]
    fn yes_variants_are_case_insensitive() {
        assert!(is_affirmative("y"));
        assert!(is_affirmative("Y\n"));
        assert!(is_affirmative(" Yes "));
        assert!(is_affirmative("YES"));
    }

    #[test]
    fn other_answers_decline() {
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative("no"));
        assert!(!is_affirmative("yep"));
        assert!(!is_affirmative("ja"));
    }

    #[test]
    fn assume_yes_always_confirms() {
        assert!(AssumeYes.confirm("Do you want to generate text?"));
    }
}

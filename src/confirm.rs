//! Asking the user before destructive actions.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::warn;

/// Asks the user a yes/no question. Declining is not an error.
#[async_trait::async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Answers yes to everything, used for `--yes`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

#[async_trait::async_trait]
impl Confirm for AssumeYes {
    async fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Prints the prompt to stderr and reads one line from stdin. Only `y` or `yes` (any case)
/// confirms.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompt;

#[async_trait::async_trait]
impl Confirm for StdinPrompt {
    async fn confirm(&self, prompt: &str) -> bool {
        let mut stderr = tokio::io::stderr();
        let question = format!("{prompt} [y/N] ");
        if let Err(e) = stderr.write_all(question.as_bytes()).await {
            warn!("Unable to write the confirmation prompt: {e}");
            return false;
        }
        let _ = stderr.flush().await;

        let mut line = String::new();
        match BufReader::new(tokio::io::stdin()).read_line(&mut line).await {
            Ok(_) => is_yes(&line),
            Err(e) => {
                warn!("Unable to read the confirmation answer: {e}");
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES \r\n"));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }

    #[tokio::test]
    async fn test_assume_yes() {
        assert!(AssumeYes.confirm("Delete?").await);
    }
}

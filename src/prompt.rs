use anyhow::Result;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[async_trait]
pub trait Confirm: Send + Sync {
    /// Blocks until the operator answers. `true` means go on.
    async fn confirm(&self, question: &str) -> Result<bool>;
}

pub struct StdinPrompt;

#[async_trait]
impl Confirm for StdinPrompt {
    async fn confirm(&self, question: &str) -> Result<bool> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("{} (y/n) ", question).as_bytes())
            .await?;
        stdout.flush().await?;

        let mut answer = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut answer)
            .await?;

        Ok(is_yes(&answer))
    }
}

pub fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

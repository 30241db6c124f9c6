//! Interactive chat loop over the query engine.

use std::io::Write;
use std::time::Instant;

use futures_util::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::error;

use askdocs_core::{Embedder, Generator, Result, SourceNode, VectorStore};
use askdocs_query::QueryEngine;

/// Whether the input is a session-ending command.
pub fn is_exit_command(input: &str) -> bool {
    input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit")
}

/// Run the interactive loop until exit keyword, end-of-input, or interrupt.
///
/// Per-query failures are logged and the loop continues; only the user ends
/// the session.
pub async fn run_chat_loop<S, E, G>(engine: &QueryEngine<S, E, G>) -> Result<()>
where
    S: VectorStore,
    E: Embedder,
    G: Generator,
{
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    println!("\nChat ready. Type 'quit' or 'exit' to end.");

    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = signal::ctrl_c() => {
                println!();
                break;
            }
        };

        let Some(line) = line else {
            // End of input
            println!();
            break;
        };

        let input = line.trim();
        if is_exit_command(input) {
            break;
        }
        if input.is_empty() {
            println!("Please enter a question.");
            continue;
        }

        if let Err(e) = answer(engine, input).await {
            error!("Query failed: {e}");
            eprintln!("\nAn error occurred: {e}");
            eprintln!("Returning to prompt.\n");
        }
    }

    println!("Exiting chat.");
    Ok(())
}

/// Run one query: stream the answer, then print the retrieved sources.
async fn answer<S, E, G>(engine: &QueryEngine<S, E, G>, question: &str) -> Result<()>
where
    S: VectorStore,
    E: Embedder,
    G: Generator,
{
    let start = Instant::now();
    let mut response = engine.query(question).await?;

    println!("\n--- Answer ---");

    loop {
        tokio::select! {
            token = response.tokens.next() => match token {
                Some(Ok(token)) => {
                    print!("{token}");
                    std::io::stdout().flush()?;
                }
                Some(Err(e)) => {
                    println!();
                    return Err(e);
                }
                None => break,
            },
            _ = signal::ctrl_c() => {
                // Abort this answer, keep the session
                println!("\n[interrupted]");
                break;
            }
        }
    }

    println!();
    println!("Response time: {:.2}s", start.elapsed().as_secs_f64());

    print_sources(&response.sources);
    Ok(())
}

fn print_sources(sources: &[SourceNode]) {
    println!("\n--- Retrieved Sources ---");
    if sources.is_empty() {
        println!("  - No sources retrieved.");
    } else {
        for (i, node) in sources.iter().enumerate() {
            println!("  Source {}:", i + 1);
            println!("    ID: {}", node.id);
            println!("    Score: {:.4}", node.score);
            println!("    File: {}", node.file_name().unwrap_or("N/A"));
        }
    }
    println!("-------------------------\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_commands_case_insensitive() {
        assert!(is_exit_command("quit"));
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("QUIT"));
        assert!(is_exit_command("Exit"));
        assert!(!is_exit_command(""));
        assert!(!is_exit_command("how do I exit a cave?"));
    }
}

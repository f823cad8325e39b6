//! Interactive chat command
//!
//! REPL reading one question per line. Exit tokens (`quit`, `exit`, `q`,
//! any case) and end-of-input leave cleanly; empty input asks again and is
//! never treated as an exit. Per-question errors are printed and the loop
//! continues.

use crate::chat::ChatSession;
use crate::config::AnamnesisConfig;
use crate::error::Result;
use std::io::{self, Write};

/// Handle the chat command.
pub async fn handle(config: AnamnesisConfig) -> Result<()> {
    let (store, generator) = super::build_components(&config).await?;
    let retriever = super::build_retriever(store, generator.clone(), &config);
    let session = ChatSession::new(retriever, generator);

    println!("Anamnesis initialized - semantic diary analysis");
    println!("Type 'quit' to exit");
    println!();

    loop {
        print!("Ask about the diary: ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // end of input
            println!();
            break;
        }

        let query = input.trim();
        if query.is_empty() {
            println!("Please enter a question.");
            continue;
        }
        if matches!(query.to_lowercase().as_str(), "quit" | "exit" | "q") {
            break;
        }

        println!("\nSearching the diary...");
        match session.chat(query).await {
            Ok(answer) => {
                println!();
                println!("{}", "=".repeat(80));
                println!("{}", answer);
                println!("{}", "=".repeat(80));
                println!();
            }
            Err(e) => {
                println!("Error: {}", e);
                println!("Please try again.");
                println!();
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

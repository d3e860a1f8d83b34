use futures::StreamExt;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

use nebius::{ApiHandler, ApiStreamChunk, Message, NebiusHandler, NebiusOptions, RetryPolicy, Retrying};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ============================================================================================
    // Step 1: Setup
    // ============================================================================================
    // Options come from NEBIUS_API_KEY / NEBIUS_MODEL_ID. Run with RUST_LOG=nebius=debug to
    // see the request and the retry decisions.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let handler = Retrying::new(NebiusHandler::new(NebiusOptions::from_env()), RetryPolicy::from_env());
    let model = handler.get_model();
    eprintln!("Using {} ({} token context)", model.id, model.info.context_window);

    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Write a haiku about Rust programming.".to_string());
    let messages = vec![Message::user(prompt)];

    // ============================================================================================
    // Step 2: Consume Stream
    // ============================================================================================
    // Events are deltas: print text as it arrives, reasoning to stderr, usage at the end.
    let mut stream = handler.create_message("You are a helpful assistant.", &messages);

    while let Some(event) = stream.next().await {
        match event {
            Ok(ApiStreamChunk::Text { text }) => {
                print!("{}", text);
                io::stdout().flush()?;
            }
            Ok(ApiStreamChunk::Reasoning { reasoning }) => eprint!("{}", reasoning),
            Ok(ApiStreamChunk::Usage { input_tokens, output_tokens }) => {
                let cost = model.info.calculate_cost(input_tokens, output_tokens);
                eprintln!("\n[{} in / {} out, ${:.6}]", input_tokens, output_tokens, cost);
            }
            Err(e) => {
                eprintln!("\nError: {}", e);
                break;
            }
        }
    }
    println!();

    Ok(())
}

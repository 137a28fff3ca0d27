use std::path::Path;

use smeta_core::calculate_quote;
use tracing::info;

use crate::commands::{load_input, load_rate_book, CommandResult};

pub fn run(input_path: &Path, rates_path: Option<&Path>, pretty: bool) -> CommandResult {
    let input = match load_input(input_path) {
        Ok(input) => input,
        Err(error) => return CommandResult::failure("calculate", "io", format!("{error:#}"), 1),
    };
    let rate_book = match load_rate_book(rates_path) {
        Ok(book) => book,
        Err(error) => return CommandResult::failure("calculate", "io", format!("{error:#}"), 1),
    };

    info!(
        quote_id = %input.header.quote_id,
        lines = input.lines.len(),
        "running quote calculation"
    );

    match calculate_quote(&input, &rate_book) {
        Ok(outcome) => {
            let serialized = if pretty {
                serde_json::to_string_pretty(&outcome)
            } else {
                serde_json::to_string(&outcome)
            };
            match serialized {
                Ok(output) => CommandResult { exit_code: 0, output },
                Err(error) => {
                    CommandResult::failure("calculate", "serialization", error.to_string(), 1)
                }
            }
        }
        Err(error) => CommandResult::failure("calculate", error.class(), error.to_string(), 1),
    }
}

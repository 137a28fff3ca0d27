use std::path::Path;

use smeta_core::validate_input;

use crate::commands::{load_input, CommandResult};

pub fn run(input_path: &Path) -> CommandResult {
    let input = match load_input(input_path) {
        Ok(input) => input,
        Err(error) => return CommandResult::failure("check", "io", format!("{error:#}"), 1),
    };

    match validate_input(&input) {
        Ok(()) => CommandResult::success(
            "check",
            format!("quote `{}` with {} line(s) is valid", input.header.quote_id, input.lines.len()),
        ),
        Err(error) => CommandResult::failure("check", error.class(), error.to_string(), 1),
    }
}

use std::collections::BTreeMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Serialize;
use smeta_core::rates::CountryProfile;

use crate::commands::{load_rate_book, CommandResult};

#[derive(Debug, Serialize)]
struct RatesReport {
    command: &'static str,
    status: &'static str,
    countries: BTreeMap<String, CountryProfile>,
    /// region -> country (or "default") -> markup pct
    internal_markup: BTreeMap<String, BTreeMap<String, Decimal>>,
}

pub fn run(rates_path: Option<&Path>) -> CommandResult {
    let rate_book = match load_rate_book(rates_path) {
        Ok(book) => book,
        Err(error) => return CommandResult::failure("rates", "io", format!("{error:#}"), 1),
    };

    let countries = rate_book
        .countries()
        .map(|(name, profile)| (name.to_string(), profile.clone()))
        .collect();

    let mut internal_markup: BTreeMap<String, BTreeMap<String, Decimal>> = BTreeMap::new();
    for (region, country, pct) in rate_book.internal_markups() {
        internal_markup
            .entry(region.country_key().to_string())
            .or_default()
            .insert(country.unwrap_or("default").to_string(), pct);
    }

    let report = RatesReport { command: "rates", status: "ok", countries, internal_markup };
    match serde_json::to_string_pretty(&report) {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(error) => CommandResult::failure("rates", "serialization", error.to_string(), 1),
    }
}

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use smeta_cli::commands::{calculate, check, rates};

const QUOTE_JSON: &str = r#"{
  "header": { "quote_id": "Q-2026-0147", "prepared_on": "2026-03-12" },
  "lines": [
    {
      "name": "pump",
      "unit_price": 1000,
      "quantity": 10,
      "weight_kg": 12.5,
      "currency": "USD",
      "supplier_country": "Turkey",
      "customs_code": "8413 70 210 0"
    }
  ],
  "variables": {
    "company": { "seller_region": "russia", "sale_type": "поставка" },
    "financial": { "quote_currency": "USD", "markup_pct": 15 },
    "logistics": {
      "incoterms": "DDP",
      "delivery_days": 30,
      "supplier_to_hub": { "amount": 500, "currency": "USD" },
      "hub_to_border": { "amount": 200, "currency": "USD" },
      "border_to_client": { "amount": 300, "currency": "USD" },
      "insurance_rate_pct": 0.15
    },
    "payment": {
      "advance_from_client_pct": 50,
      "advance_to_supplier_pct": 100,
      "client_milestones": [ { "pct": 50, "days_after_delivery": 30 } ]
    },
    "clearance": {
      "brokerage_at_hub": { "amount": 0, "currency": "USD" },
      "brokerage_at_customs": { "amount": 0, "currency": "USD" },
      "warehousing": { "amount": 0, "currency": "USD" },
      "documentation": { "amount": 0, "currency": "USD" },
      "extra": { "amount": 0, "currency": "USD" }
    },
    "taxes": { "import_tariff_pct": 5 },
    "admin": { "annual_interest_pct": 16 }
  }
}"#;

fn write_quote(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("quote.json");
    fs::write(&path, contents).expect("write quote file");
    path
}

#[test]
fn calculate_emits_the_full_outcome_as_json() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_quote(&dir, QUOTE_JSON);

    let result = calculate::run(&path, None, false);
    assert_eq!(result.exit_code, 0);

    let outcome: serde_json::Value =
        serde_json::from_str(&result.output).expect("outcome is JSON");
    assert_eq!(outcome["header"]["quote_id"], "Q-2026-0147");
    assert_eq!(outcome["lines"].as_array().map(Vec::len), Some(1));
    // Turkish VAT stripped: 1000 / 1.2 * 10.
    assert_eq!(outcome["totals"]["total_purchase_value"], "8333.33");
    // 100% supplier advance leaves no financing cost.
    assert_eq!(outcome["totals"]["total_financing_cost"], "0");
    assert!(outcome["trace"]["steps"].as_array().is_some_and(|steps| !steps.is_empty()));
}

#[test]
fn calculate_maps_engine_errors_to_structured_output() {
    let dir = TempDir::new().expect("temp dir");
    let broken = QUOTE_JSON.replace("\"quantity\": 10", "\"quantity\": 0");
    let path = write_quote(&dir, &broken);

    let result = calculate::run(&path, None, false);
    assert_eq!(result.exit_code, 1);
    let payload: serde_json::Value = serde_json::from_str(&result.output).expect("payload");
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["error_class"], "invalid_input");
    assert!(payload["message"].as_str().is_some_and(|m| m.contains("quantity")));
}

#[test]
fn check_validates_without_calculating() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_quote(&dir, QUOTE_JSON);

    let result = check::run(&path);
    assert_eq!(result.exit_code, 0);
    let payload: serde_json::Value = serde_json::from_str(&result.output).expect("payload");
    assert_eq!(payload["status"], "ok");
}

#[test]
fn missing_quote_file_is_an_io_failure() {
    let result = check::run(&PathBuf::from("/nonexistent/quote.json"));
    assert_eq!(result.exit_code, 1);
    let payload: serde_json::Value = serde_json::from_str(&result.output).expect("payload");
    assert_eq!(payload["error_class"], "io");
}

#[test]
fn rates_reports_the_effective_tables() {
    let dir = TempDir::new().expect("temp dir");
    let rates_path = dir.path().join("rates.toml");
    fs::write(&rates_path, "[countries.germany]\nvat_pct = 19\nprice_includes_vat = true\n")
        .expect("write rates file");

    let result = rates::run(Some(&rates_path));
    assert_eq!(result.exit_code, 0);
    let report: serde_json::Value = serde_json::from_str(&result.output).expect("report");
    assert_eq!(report["countries"]["china"]["price_includes_vat"], false);
    assert_eq!(report["countries"]["germany"]["vat_pct"], "19");
    assert!(report["internal_markup"]["russia"]["default"].is_string());
}

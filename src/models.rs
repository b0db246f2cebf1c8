//! Core data models for the company profile pipeline

use serde::{Deserialize, Serialize};
use serde_json::Value;

//
// ================= Registry payloads =================
//

/// Raw search response from the PDS registry API.
///
/// Records are kept loosely typed: PDS field-name casing is inconsistent
/// (`addressLine` vs `Address_Line`), so the normalizer picks fields out of
/// the raw JSON instead of forcing a schema here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub result: Vec<Value>,
}

impl SearchResponse {
    /// First record whose `kind` is the literal "Company", if any.
    pub fn company_record(&self) -> Option<&Value> {
        self.result
            .iter()
            .find(|r| r.get("kind").and_then(Value::as_str) == Some("Company"))
    }
}

//
// ================= Holdings =================
//

/// One quarterly 13-F snapshot row from the holdings agent.
///
/// Numeric fields are optional: thin coverage quarters come back with gaps
/// and must render as "n/a" rather than fail deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingsSnapshot {
    pub date: String,
    #[serde(rename = "investorsHolding", default)]
    pub investors_holding: Option<f64>,
    #[serde(rename = "numberOf13Fshares", default)]
    pub number_of_13f_shares: Option<f64>,
    #[serde(rename = "totalInvested", default)]
    pub total_invested: Option<f64>,
    #[serde(rename = "ownershipPercent", default)]
    pub ownership_percent: Option<f64>,
    #[serde(rename = "newPositions", default)]
    pub new_positions: Option<f64>,
    #[serde(rename = "increasedPositions", default)]
    pub increased_positions: Option<f64>,
    #[serde(rename = "reducedPositions", default)]
    pub reduced_positions: Option<f64>,
    #[serde(rename = "closedPositions", default)]
    pub closed_positions: Option<f64>,
    #[serde(rename = "putCallRatio", default)]
    pub put_call_ratio: Option<f64>,
}

//
// ================= Formatting helpers =================
//

/// Pretty-print a large count or dollar amount: "1.2 B", "3.4 M", "12,345".
pub fn fmt_amount(n: Option<f64>) -> String {
    let Some(n) = n else {
        return "n/a".to_string();
    };
    if n.abs() >= 1_000_000_000.0 {
        format!("{:.1} B", n / 1_000_000_000.0)
    } else if n.abs() >= 1_000_000.0 {
        format!("{:.1} M", n / 1_000_000.0)
    } else {
        group_thousands(n.round() as i64)
    }
}

/// Two-decimal rendering for ratios and percentages.
pub fn fmt_ratio(n: Option<f64>) -> String {
    match n {
        Some(n) => format!("{:.2}", n),
        None => "n/a".to_string(),
    }
}

fn group_thousands(n: i64) -> String {
    let digits = n.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if n < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

//! Geographic Classifier
//!
//! Partitions deduplicated addresses into:
//! - Domestic: up to 3 U.S. addresses, first-seen order (first = headquarters)
//! - International: distinct non-U.S. country codes, uppercased and sorted

use serde_json::Value;
use std::collections::BTreeSet;

use crate::normalize::CleanAddress;

/// Home jurisdiction for the report.
const DOMESTIC_COUNTRY: &str = "US";

/// Cap on quoted domestic addresses.
const MAX_DOMESTIC: usize = 3;

const COUNTRY_KEYS: &[&str] = &["country", "Country"];

/// Classified address buckets for one company record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressBucket {
    pub domestic: Vec<String>,
    pub international_codes: Vec<String>,
}

impl AddressBucket {
    /// "; "-joined domestic addresses, or "None".
    pub fn us_block(&self) -> String {
        if self.domestic.is_empty() {
            "None".to_string()
        } else {
            self.domestic.join("; ")
        }
    }

    /// ", "-joined sorted country codes, or "None".
    pub fn intl_block(&self) -> String {
        if self.international_codes.is_empty() {
            "None".to_string()
        } else {
            self.international_codes.join(", ")
        }
    }
}

/// Address classifier
pub struct GeoClassifier;

impl GeoClassifier {
    /// Classify deduplicated addresses into domestic / international buckets.
    ///
    /// Domestic entries are truncated at 3 without reordering or ranking.
    /// International codes are deduplicated, uppercased, and sorted for
    /// deterministic output; blank codes are dropped.
    pub fn classify(addresses: &[CleanAddress]) -> AddressBucket {
        let domestic: Vec<String> = addresses
            .iter()
            .filter(|a| is_domestic(&a.record))
            .take(MAX_DOMESTIC)
            .map(|a| a.pretty.clone())
            .collect();

        let international_codes: BTreeSet<String> = addresses
            .iter()
            .filter(|a| !is_domestic(&a.record))
            .filter_map(|a| country_code(&a.record))
            .map(|code| code.to_uppercase())
            .filter(|code| !code.is_empty())
            .collect();

        AddressBucket {
            domestic,
            international_codes: international_codes.into_iter().collect(),
        }
    }
}

/// A record is domestic iff its country code is exactly "US".
/// Absent or unknown codes classify as international by default.
fn is_domestic(record: &Value) -> bool {
    country_code(record) == Some(DOMESTIC_COUNTRY)
}

fn country_code(record: &Value) -> Option<&str> {
    COUNTRY_KEYS
        .iter()
        .filter_map(|k| record.get(*k))
        .filter_map(Value::as_str)
        .find(|s| !s.is_empty())
}

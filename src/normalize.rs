//! Record normalization for raw PDS payloads
//!
//! PDS records arrive with inconsistent field-name casing (`addressLine` vs
//! `Address_Line`, `region` vs `State`). This module flattens each record
//! into a canonical printable string and deduplicates on the lower-cased
//! form, preserving first-seen order.

use serde_json::Value;
use std::collections::HashSet;

/// Street-line markers PDS uses for placeholder rows.
const NO_ADDRESS_MARKER: &str = "no address line";

const STREET_KEYS: &[&str] = &["addressLine", "Address_Line"];
const CITY_KEYS: &[&str] = &["city", "City"];
const REGION_KEYS: &[&str] = &["region", "State"];
const POSTAL_KEYS: &[&str] = &["postal", "Zip"];

/// A usable address: the printable form plus the raw record it came from
/// (the classifier still needs the country field).
#[derive(Debug, Clone)]
pub struct CleanAddress {
    pub pretty: String,
    pub record: Value,
}

/// First non-empty string value among synonymous field-name variants.
fn first_nonempty<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| record.get(*k))
        .filter_map(Value::as_str)
        .find(|s| !s.is_empty())
}

/// Loose truthiness check, matching how PDS populates flag fields
/// (booleans, "true"/"false" strings, 0/1 numbers all occur).
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
        _ => false,
    }
}

/// Prettify one address record → "Street, City, ST, ZIP" (blanks skipped).
///
/// A record missing every field normalizes to the empty string; the harvest
/// pass drops it via the same emptiness rule rather than treating it as an
/// error.
pub fn format_address(record: &Value) -> String {
    [STREET_KEYS, CITY_KEYS, REGION_KEYS, POSTAL_KEYS]
        .iter()
        .filter_map(|keys| first_nonempty(record, keys))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Harvest usable addresses: skip suppressed / blank / placeholder rows,
/// deduplicate case-insensitively, keep first-seen order (downstream treats
/// the first address as the headquarters).
pub fn harvest_addresses(raw: &[Value]) -> Vec<CleanAddress> {
    let mut clean: Vec<CleanAddress> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for record in raw {
        if is_truthy(record.get("suppress")) {
            continue;
        }
        let line = first_nonempty(record, STREET_KEYS).unwrap_or("");
        if line.is_empty() || line.to_lowercase().contains(NO_ADDRESS_MARKER) {
            continue;
        }

        let pretty = format_address(record);
        let key = pretty.to_lowercase();
        if seen.insert(key) {
            clean.push(CleanAddress {
                pretty,
                record: record.clone(),
            });
        }
    }

    clean
}

/// Single-line officer rendering: "Jane Doe, born 1970 – Directed By".
pub fn format_officer(record: &Value) -> String {
    let name = record
        .get("name")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .or_else(|| {
            record
                .pointer("/primaryName/fullName")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        })
        .unwrap_or("Unnamed individual");

    let dob = match record.get("dateOfBirth") {
        Some(Value::String(s)) if !s.is_empty() => format!(", born {}", s),
        Some(Value::Number(n)) => format!(", born {}", n),
        _ => String::new(),
    };

    let rel = record
        .get("relType")
        .and_then(Value::as_str)
        .unwrap_or("");

    format!("{}{} – {}", name, dob, title_case(&rel.replace('_', " ")))
}

/// Deduplicate officers by exact rendered-string equality, first-seen order.
pub fn harvest_officers(raw: &[Value]) -> Vec<String> {
    let mut officers: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for record in raw {
        if !is_truthy(Some(record)) {
            continue;
        }
        let rendered = format_officer(record);
        if seen.insert(rendered.clone()) {
            officers.push(rendered);
        }
    }

    officers
}

/// Capitalize the first letter of each whitespace-separated word,
/// lower-casing the rest: "DIRECTED BY" → "Directed By".
fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_address_skips_blanks() {
        let record = json!({
            "addressLine": "1750 Tysons Blvd",
            "city": "",
            "region": "VA",
            "postal": "22102"
        });
        assert_eq!(format_address(&record), "1750 Tysons Blvd, VA, 22102");
    }

    #[test]
    fn test_format_address_uses_casing_variants() {
        let record = json!({
            "Address_Line": "10 Downing St",
            "City": "London",
            "State": "",
            "Zip": "SW1A 2AA"
        });
        assert_eq!(format_address(&record), "10 Downing St, London, SW1A 2AA");
    }

    #[test]
    fn test_format_address_empty_record() {
        assert_eq!(format_address(&json!({})), "");
    }

    #[test]
    fn test_harvest_dedupes_case_insensitively() {
        let raw = vec![
            json!({"addressLine": "1 Main St", "city": "Albany"}),
            json!({"addressLine": "1 MAIN ST", "city": "ALBANY"}),
            json!({"addressLine": "2 Side Ave", "city": "Albany"}),
        ];
        let clean = harvest_addresses(&raw);
        assert_eq!(clean.len(), 2);
        assert_eq!(clean[0].pretty, "1 Main St, Albany");
        assert_eq!(clean[1].pretty, "2 Side Ave, Albany");
    }

    #[test]
    fn test_harvest_skips_suppressed_rows() {
        let raw = vec![
            json!({"addressLine": "1 Main St", "suppress": true}),
            json!({"addressLine": "2 Side Ave", "suppress": "true"}),
            json!({"addressLine": "3 Back Rd", "suppress": false}),
        ];
        let clean = harvest_addresses(&raw);
        assert_eq!(clean.len(), 1);
        assert_eq!(clean[0].pretty, "3 Back Rd");
    }

    #[test]
    fn test_harvest_skips_placeholder_street_lines() {
        let raw = vec![
            json!({"addressLine": "No Address Line Given", "city": "Albany"}),
            json!({"city": "Albany"}),
            json!({}),
        ];
        assert!(harvest_addresses(&raw).is_empty());
    }

    #[test]
    fn test_harvest_preserves_first_seen_order() {
        let raw = vec![
            json!({"addressLine": "C St"}),
            json!({"addressLine": "A St"}),
            json!({"addressLine": "B St"}),
        ];
        let clean = harvest_addresses(&raw);
        let order: Vec<&str> = clean.iter().map(|c| c.pretty.as_str()).collect();
        assert_eq!(order, vec!["C St", "A St", "B St"]);
    }

    #[test]
    fn test_format_officer_name_fallback_chain() {
        let by_name = json!({"name": "Jane Doe", "relType": "DIRECTED_BY"});
        assert_eq!(format_officer(&by_name), "Jane Doe – Directed By");

        let by_primary = json!({
            "primaryName": {"fullName": "John Roe"},
            "relType": "OFFICER_OF"
        });
        assert_eq!(format_officer(&by_primary), "John Roe – Officer Of");

        let nameless = json!({"relType": "DIRECTED_BY"});
        assert_eq!(format_officer(&nameless), "Unnamed individual – Directed By");
    }

    #[test]
    fn test_format_officer_with_dob() {
        let record = json!({
            "name": "Jane Doe",
            "dateOfBirth": "1970-01-01",
            "relType": "DIRECTED_BY"
        });
        assert_eq!(
            format_officer(&record),
            "Jane Doe, born 1970-01-01 – Directed By"
        );
    }

    #[test]
    fn test_harvest_officers_dedupes_rendered_form() {
        let raw = vec![
            json!({"name": "Jane Doe", "relType": "DIRECTED_BY"}),
            json!({"name": "Jane Doe", "relType": "DIRECTED_BY"}),
            json!({}),
            json!({"name": "John Roe", "relType": "OFFICER_OF"}),
        ];
        let officers = harvest_officers(&raw);
        assert_eq!(
            officers,
            vec!["Jane Doe – Directed By", "John Roe – Officer Of"]
        );
    }
}

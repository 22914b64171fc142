//! Recipient shapes: autocomplete matches and recipient profiles.

use super::lenient;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A match from `autocomplete/recipient/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientMatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uei: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duns: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl RecipientMatch {
    /// Autocomplete rows have used several key spellings; the first present wins.
    pub fn from_raw(value: Value) -> Self {
        let field = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| value.get(*k).and_then(lenient::value_to_string))
        };
        Self {
            name: field(&["recipient_name", "name", "legal_business_name"]),
            recipient_id: field(&["recipient_id", "recipient_hash", "id"]),
            uei: field(&["uei"]),
            duns: field(&["duns"]),
            level: field(&["recipient_level"]).map(|l| level_label(&l)),
        }
    }
}

/// Upstream level codes: P(arent), C(hild), R(ecipient without parent).
pub fn level_label(code: &str) -> String {
    match code.trim().to_uppercase().as_str() {
        "P" => "parent".into(),
        "C" => "child".into(),
        "R" => "recipient".into(),
        _ => code.trim().to_string(),
    }
}

/// Profile returned by `recipient/{hash}/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uei: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duns: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_uei: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternate_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub business_types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_transaction_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_transactions: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawLocation {
    #[serde(default, deserialize_with = "lenient::string")]
    city_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    state_code: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    country_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawRecipientProfile {
    #[serde(default, deserialize_with = "lenient::string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    recipient_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    uei: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    duns: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    recipient_level: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    parent_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    parent_uei: Option<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    alternate_names: Vec<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    business_types: Vec<String>,
    #[serde(default, deserialize_with = "lenient::nested")]
    location: Option<RawLocation>,
    #[serde(default, deserialize_with = "lenient::amount")]
    total_transaction_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::amount")]
    total_transactions: Option<f64>,
}

impl RecipientProfile {
    pub fn from_raw(value: Value) -> Self {
        let raw: RawRecipientProfile = lenient::record(value);
        let location = raw.location.unwrap_or_default();
        Self {
            name: raw.name,
            recipient_id: raw.recipient_id,
            uei: raw.uei,
            duns: raw.duns,
            level: raw.recipient_level.map(|l| level_label(&l)),
            parent_name: raw.parent_name,
            parent_uei: raw.parent_uei,
            alternate_names: raw.alternate_names,
            business_types: raw.business_types,
            city: location.city_name,
            state: location.state_code,
            country: location.country_code,
            total_transaction_amount: raw.total_transaction_amount,
            total_transactions: raw.total_transactions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn autocomplete_match_accepts_alternate_keys() {
        let m = RecipientMatch::from_raw(json!({
            "legal_business_name": "BOOZ ALLEN HAMILTON INC.",
            "id": "e5f2a7b0-P",
            "uei": "LKJ1234567",
            "recipient_level": "P"
        }));
        assert_eq!(m.name.as_deref(), Some("BOOZ ALLEN HAMILTON INC."));
        assert_eq!(m.recipient_id.as_deref(), Some("e5f2a7b0-P"));
        assert_eq!(m.level.as_deref(), Some("parent"));
    }

    #[test]
    fn unknown_level_passes_through() {
        assert_eq!(level_label("c"), "child");
        assert_eq!(level_label("X"), "X");
    }

    #[test]
    fn profile_flattens_location() {
        let profile = RecipientProfile::from_raw(json!({
            "name": "ACME LLC",
            "recipient_id": "abc-R",
            "recipient_level": "R",
            "business_types": ["small_business", "woman_owned_business"],
            "location": {"city_name": "ARLINGTON", "state_code": "VA", "country_code": "USA"},
            "total_transaction_amount": "1500000.25",
            "total_transactions": 37
        }));
        assert_eq!(profile.state.as_deref(), Some("VA"));
        assert_eq!(profile.business_types.len(), 2);
        assert_eq!(profile.total_transaction_amount, Some(1500000.25));
        assert_eq!(profile.total_transactions, Some(37.0));
        assert_eq!(profile.level.as_deref(), Some("recipient"));
    }

    #[test]
    fn empty_profile_is_all_absent() {
        assert_eq!(RecipientProfile::from_raw(json!({})), RecipientProfile::default());
    }
}

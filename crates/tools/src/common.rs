//! Pieces shared by every handler: the invocation context, argument decoding,
//! the filter parameter schema, and the success payload builder.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use spendlens_client::SpendingClient;
use spendlens_config::ToolsConfig;
use spendlens_core::{ToolError, ToolResult};
use spendlens_query::{Clock, DateWarning, FilterCompiler};
use std::sync::Arc;
use tracing::warn;

/// Hard ceiling on `limit` for every search endpoint.
pub const MAX_LIMIT: u32 = 100;

/// Everything a handler needs beyond its arguments.
pub struct ToolContext {
    pub client: Arc<SpendingClient>,
    pub clock: Clock,
    pub config: ToolsConfig,
}

impl ToolContext {
    pub fn new(client: Arc<SpendingClient>, clock: Clock, config: ToolsConfig) -> Self {
        Self {
            client,
            clock,
            config,
        }
    }

    /// A compiler pinned to today's date for the duration of one call.
    pub fn compiler(&self) -> FilterCompiler {
        FilterCompiler::new(self.clock.today())
    }

    /// Resolve a caller limit against a default, within `1..=MAX_LIMIT`.
    pub fn limit(&self, requested: Option<u32>, default: u32) -> u32 {
        requested.unwrap_or(default).clamp(1, MAX_LIMIT)
    }
}

/// Decode tool arguments into a typed parameter struct.
///
/// A missing argument object is treated as `{}`.
pub fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolError> {
    let arguments = match arguments {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// A required, non-blank identifier argument.
pub fn require_id(value: &str, field: &str) -> Result<String, ToolError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ToolError::InvalidArguments(format!(
            "'{field}' must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Percent-encode an identifier for use as one URL path segment.
pub fn path_segment(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for byte in id.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

/// `$1,234,567.89`
pub fn format_amount(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!(
        "{}${}.{:02}",
        if negative { "-" } else { "" },
        grouped,
        cents % 100
    )
}

/// The success payload: a `summary` line plus structured fields.
pub struct Payload {
    fields: Map<String, Value>,
}

impl Payload {
    pub fn new(summary: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("summary".into(), Value::String(summary.into()));
        Self { fields }
    }

    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or_else(|e| {
            warn!(field = %key, error = %e, "Failed to serialize payload field");
            Value::Null
        });
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Attach date fallbacks, if any were taken.
    pub fn with_warnings(self, warnings: &[DateWarning]) -> Self {
        if warnings.is_empty() {
            self
        } else {
            self.with("warnings", warnings)
        }
    }

    pub fn into_result(self) -> ToolResult {
        ToolResult::from_payload(Value::Object(self.fields))
    }
}

/// JSON Schema properties for the shared search filter parameters.
pub fn filter_properties() -> Map<String, Value> {
    let schema = json!({
        "keywords": {
            "type": "array",
            "items": { "type": "string" },
            "description": "Free-text keywords matched against award descriptions"
        },
        "recipient_name": {
            "type": "string",
            "description": "Recipient (vendor) name to search for"
        },
        "agency_name": {
            "type": "string",
            "description": "Awarding top-tier agency name, e.g. 'Department of Defense'"
        },
        "naics_codes": {
            "type": "array",
            "items": { "type": "string" },
            "description": "NAICS industry codes"
        },
        "psc_codes": {
            "type": "array",
            "items": { "type": "string" },
            "description": "Product/Service codes"
        },
        "start_date": {
            "type": "string",
            "description": "Start date: YYYY-MM-DD or a phrase like '6 months ago'. Defaults to one year before today when only end_date is given"
        },
        "end_date": {
            "type": "string",
            "description": "End date: YYYY-MM-DD or a phrase like 'today'. Defaults to today when only start_date is given"
        },
        "date_range": {
            "type": "string",
            "description": "Natural range such as 'last 30 days', 'last quarter', 'last year' or 'FY2024'. Overrides start_date/end_date"
        },
        "fiscal_year": {
            "type": "integer",
            "description": "Federal fiscal year (Oct 1 of the prior year through Sep 30). Overrides every other date parameter"
        },
        "min_amount": {
            "type": "number",
            "description": "Minimum award amount in dollars"
        },
        "max_amount": {
            "type": "number",
            "description": "Maximum award amount in dollars"
        },
        "state": {
            "type": "string",
            "description": "Two-letter place-of-performance state code"
        },
        "award_type_codes": {
            "type": "array",
            "items": { "type": "string" },
            "description": "Award type codes (default: A, B, C, D contract types)"
        },
        "set_aside_type_codes": {
            "type": "array",
            "items": { "type": "string" },
            "description": "Set-aside type codes, e.g. 'SBA', '8A', 'SDVOSBC'"
        },
        "extent_competed_type_codes": {
            "type": "array",
            "items": { "type": "string" },
            "description": "Extent-competed codes, e.g. 'A' (full and open), 'C' (not competed)"
        },
        "contract_pricing_type_codes": {
            "type": "array",
            "items": { "type": "string" },
            "description": "Contract pricing type codes, e.g. 'J' (firm fixed price)"
        }
    });
    match schema {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// The `limit` property with its default and ceiling.
pub fn limit_property(default: u32, description: &str) -> Value {
    json!({
        "type": "integer",
        "minimum": 1,
        "maximum": MAX_LIMIT,
        "default": default,
        "description": description
    })
}

/// An object schema from a property map.
pub fn object_schema(properties: Map<String, Value>, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": Value::Object(properties),
        "required": required
    })
}

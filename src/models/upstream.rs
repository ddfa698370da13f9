//! Wire shapes of the upstream job board API.
//!
//! Field names follow the upstream JSON (Spanish, camelCase). Everything is
//! optional: absent fields are defaulted or rejected later by the fetcher,
//! never here.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::models::ListingId;

/// One page of the listings endpoint: `{"data": [{"puesto": {...}}, ...]}`.
///
/// Records stay as raw JSON so a single malformed record can be skipped
/// without losing the rest of the page.
#[derive(Debug, Default, Deserialize)]
pub struct ListingPage {
    #[serde(default)]
    pub data: Option<Vec<Value>>,
}

impl ListingPage {
    /// A missing or empty `data` array marks the end of pagination.
    pub fn is_exhausted(&self) -> bool {
        self.data.as_ref().is_none_or(|d| d.is_empty())
    }

    pub fn records(&self) -> &[Value] {
        self.data.as_deref().unwrap_or(&[])
    }
}

/// Wrapper around a posting inside a page.
#[derive(Debug, Default, Deserialize)]
pub struct RawEntry {
    #[serde(default)]
    pub puesto: Option<RawPosting>,
}

/// A posting as served upstream.
///
/// Fields are kept as raw JSON values: a field of an unexpected type is
/// treated like a missing one instead of failing the whole record.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPosting {
    #[serde(default)]
    pub id: Option<Value>,

    /// ISO-8601 expiration timestamp
    #[serde(default)]
    pub fecha_vencimiento: Option<Value>,

    /// Region code
    #[serde(default)]
    pub id_provincia: Option<Value>,

    /// Salary code, looked up in the concepts table
    #[serde(default)]
    pub salario_ofrecido: Option<Value>,

    #[serde(default)]
    pub titulo: Option<Value>,

    #[serde(default)]
    pub descripcion: Option<Value>,

    #[serde(default)]
    pub beneficios_generales: Option<Value>,

    #[serde(default)]
    pub requisitos_generales: Option<Value>,

    /// Number of open slots
    #[serde(default)]
    pub cantidad: Option<Value>,
}

impl RawPosting {
    /// Listing id: integers and strings as such, other scalars as text.
    pub fn listing_id(&self) -> Option<ListingId> {
        match self.id.as_ref()? {
            Value::Null | Value::Array(_) | Value::Object(_) => None,
            Value::String(s) => Some(ListingId::Text(s.clone())),
            other => Some(match integral(other) {
                Some(n) => ListingId::Number(n),
                None => ListingId::Text(other.to_string()),
            }),
        }
    }

    /// Expiration timestamp, when it is a non-blank string.
    pub fn expiration(&self) -> Option<&str> {
        self.fecha_vencimiento
            .as_ref()
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// Region code; only JSON numbers with an integral value count.
    pub fn region_code(&self) -> Option<i64> {
        self.id_provincia.as_ref().and_then(integral)
    }

    /// Slot count from an integral number or a numeric string.
    pub fn slot_count(&self) -> Option<i64> {
        match self.cantidad.as_ref()? {
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite() && f.fract() == 0.0)
                        .map(|f| f as i64)
                })
            }
            other => integral(other),
        }
    }
}

/// Integer value of a JSON number, accepting floats without a fraction.
pub fn integral(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Display text of a scalar field: strings as-is, numbers and booleans
/// through their JSON rendering, anything else absent.
pub fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        v @ (Value::Number(_) | Value::Bool(_)) => Some(v.to_string()),
        _ => None,
    }
}

/// Reply of the concepts endpoint; only the salary table is used.
#[derive(Debug, Default, Deserialize)]
pub struct ConceptsResponse {
    #[serde(default)]
    pub conceptos: Concepts,
}

#[derive(Debug, Default, Deserialize)]
pub struct Concepts {
    #[serde(default)]
    pub salario: Vec<Concept>,
}

/// A coded entry of a concepts table.
#[derive(Debug, Default, Deserialize)]
pub struct Concept {
    #[serde(default)]
    pub codigo: Option<Value>,

    #[serde(default)]
    pub descripcion: Option<String>,
}

/// Reply of the flat regions endpoint: region code (as a string) to name.
pub type RegionsResponse = HashMap<String, Value>;

/// Lookup key for a code that may arrive as a JSON number or string.
pub fn code_key(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

//! Carrier data model

use serde::{Deserialize, Serialize};

use crate::error::RowError;

/// Column order of every intake CSV
pub const CSV_FIELDS: [&str; 10] = [
    "mc_number",
    "company_name",
    "dba_name",
    "address",
    "phone_number",
    "usdot_number",
    "power_units",
    "email",
    "c_status",
    "cargo_carried",
];

/// Number of cells in a well-formed row
pub const FIELD_COUNT: usize = CSV_FIELDS.len();

/// Position of `cargo_carried`, where glued rows split
pub const CARGO_FIELD_INDEX: usize = 9;

/// Fields the pipeline may overwrite on an existing carrier
///
/// `c_status` belongs to the downstream workflow; `phone_number` and
/// `usdot_number` are never refreshed.
pub const UPDATABLE_FIELDS: [&str; 6] = [
    "company_name",
    "dba_name",
    "address",
    "power_units",
    "email",
    "cargo_carried",
];

/// One CSV row mapped onto carrier field names, still untyped
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawCarrier {
    pub mc_number: String,
    pub company_name: String,
    pub dba_name: String,
    pub address: String,
    pub phone_number: String,
    pub usdot_number: String,
    pub power_units: String,
    pub email: String,
    pub c_status: String,
    pub cargo_carried: String,
}

impl RawCarrier {
    /// Map cells onto fields by position
    ///
    /// Fails unless exactly [`FIELD_COUNT`] cells are given.
    pub fn from_cells<S: AsRef<str>>(cells: &[S]) -> Result<Self, RowError> {
        let [mc_number, company_name, dba_name, address, phone_number, usdot_number, power_units, email, c_status, cargo_carried] = cells else {
            return Err(RowError::FieldCount {
                expected: FIELD_COUNT,
                found: cells.len(),
            });
        };

        Ok(Self {
            mc_number: mc_number.as_ref().to_string(),
            company_name: company_name.as_ref().to_string(),
            dba_name: dba_name.as_ref().to_string(),
            address: address.as_ref().to_string(),
            phone_number: phone_number.as_ref().to_string(),
            usdot_number: usdot_number.as_ref().to_string(),
            power_units: power_units.as_ref().to_string(),
            email: email.as_ref().to_string(),
            c_status: c_status.as_ref().to_string(),
            cargo_carried: cargo_carried.as_ref().to_string(),
        })
    }
}

/// Fleet size: a count when the extract gives a number, the raw text otherwise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PowerUnits {
    Count(i64),
    Text(String),
}

/// A typed carrier document, as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carrier {
    pub mc_number: i64,
    pub company_name: String,
    pub dba_name: String,
    pub address: String,
    pub phone_number: String,
    pub usdot_number: i64,
    pub power_units: PowerUnits,
    pub email: String,
    pub c_status: String,
    pub cargo_carried: Vec<String>,
}

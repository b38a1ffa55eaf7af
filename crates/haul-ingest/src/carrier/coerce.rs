//! Field coercion: [`RawCarrier`] strings to a typed [`Carrier`]
//!
//! `mc_number`, `usdot_number` and `cargo_carried` are required to type
//! cleanly. `power_units` is lenient: thousands separators are dropped and
//! anything still non-numeric is kept verbatim.

use super::cargo::parse_cargo_list;
use super::model::{Carrier, PowerUnits, RawCarrier};
use crate::error::CoercionError;

impl TryFrom<&RawCarrier> for Carrier {
    type Error = CoercionError;

    fn try_from(raw: &RawCarrier) -> Result<Self, Self::Error> {
        Ok(Carrier {
            mc_number: parse_integer("mc_number", &raw.mc_number)?,
            company_name: raw.company_name.clone(),
            dba_name: raw.dba_name.clone(),
            address: raw.address.clone(),
            phone_number: raw.phone_number.clone(),
            usdot_number: parse_integer("usdot_number", &raw.usdot_number)?,
            power_units: coerce_power_units(&raw.power_units),
            email: raw.email.clone(),
            c_status: raw.c_status.clone(),
            cargo_carried: parse_cargo_list(&raw.cargo_carried)?,
        })
    }
}

impl TryFrom<RawCarrier> for Carrier {
    type Error = CoercionError;

    fn try_from(raw: RawCarrier) -> Result<Self, Self::Error> {
        Carrier::try_from(&raw)
    }
}

/// Parse a required integer field, tolerating surrounding whitespace
pub fn parse_integer(field: &'static str, value: &str) -> Result<i64, CoercionError> {
    value
        .trim()
        .parse()
        .map_err(|_| CoercionError::InvalidInteger {
            field,
            value: value.to_string(),
        })
}

/// `"1,234"` becomes `Count(1234)`; `"N/A"` stays `Text("N/A")`
pub fn coerce_power_units(value: &str) -> PowerUnits {
    match value.replace(',', "").trim().parse() {
        Ok(count) => PowerUnits::Count(count),
        Err(_) => PowerUnits::Text(value.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn raw() -> RawCarrier {
        RawCarrier {
            mc_number: "100200".into(),
            company_name: "Acme Hauling".into(),
            dba_name: "".into(),
            address: "1 Depot Rd".into(),
            phone_number: "(555) 010-0000".into(),
            usdot_number: "3300".into(),
            power_units: "1,234".into(),
            email: "ops@acme.test".into(),
            c_status: "".into(),
            cargo_carried: "['General Freight', 'Machinery']".into(),
        }
    }

    #[test]
    fn test_coerce_types_required_fields() {
        let carrier = Carrier::try_from(raw()).unwrap();
        assert_eq!(carrier.mc_number, 100200);
        assert_eq!(carrier.usdot_number, 3300);
        assert_eq!(carrier.power_units, PowerUnits::Count(1234));
        assert_eq!(carrier.cargo_carried, vec!["General Freight", "Machinery"]);
        assert_eq!(carrier.phone_number, "(555) 010-0000");
    }

    #[test]
    fn test_power_units_is_lenient() {
        assert_eq!(coerce_power_units("1,234"), PowerUnits::Count(1234));
        assert_eq!(coerce_power_units(" 12 "), PowerUnits::Count(12));
        assert_eq!(coerce_power_units("N/A"), PowerUnits::Text("N/A".into()));
        assert_eq!(coerce_power_units(""), PowerUnits::Text("".into()));
    }

    #[test]
    fn test_non_numeric_mc_number_fails() {
        let mut raw = raw();
        raw.mc_number = "MC-1".into();
        assert_eq!(
            Carrier::try_from(&raw).unwrap_err(),
            CoercionError::InvalidInteger {
                field: "mc_number",
                value: "MC-1".into()
            }
        );
    }

    #[test]
    fn test_non_numeric_usdot_number_fails() {
        let mut raw = raw();
        raw.usdot_number = "1,000".into();
        assert!(matches!(
            Carrier::try_from(&raw),
            Err(CoercionError::InvalidInteger {
                field: "usdot_number",
                ..
            })
        ));
    }

    #[test]
    fn test_malformed_cargo_fails() {
        let mut raw = raw();
        raw.cargo_carried = "General Freight".into();
        assert!(matches!(
            Carrier::try_from(&raw),
            Err(CoercionError::CargoLiteral { .. })
        ));
    }
}

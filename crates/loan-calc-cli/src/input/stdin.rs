use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Deserialise a loan request piped on stdin, JSON or YAML.
/// Returns None if stdin is a TTY (interactive) or empty.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

/// A leading `{` is read as JSON, anything else as YAML.
fn parse_piped<T: DeserializeOwned>(text: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value = if trimmed.starts_with('{') {
        log::debug!("parsing stdin as JSON");
        serde_json::from_str(trimmed).map_err(|e| format!("Failed to parse stdin as JSON: {e}"))?
    } else {
        log::debug!("parsing stdin as YAML");
        serde_yaml::from_str(trimmed).map_err(|e| format!("Failed to parse stdin as YAML: {e}"))?
    };
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_calc_core::amortization::{InsuranceSpec, LoanRequest};
    use rust_decimal::Decimal;

    #[test]
    fn test_blank_input_is_none() {
        let parsed: Option<LoanRequest> = parse_piped("  \n").unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn test_json_request() {
        let parsed: LoanRequest =
            parse_piped(r#"{"principal": "12000", "annual_rate": "0", "term": 12}"#)
                .unwrap()
                .unwrap();
        assert_eq!(parsed.term, 12);
        assert_eq!(parsed.annual_rate, Decimal::ZERO);
    }

    #[test]
    fn test_yaml_request() {
        let text = "principal: \"30000\"\nannual_rate: \"4.45\"\nterm: 57\ninsurance:\n  mode: fixed\n  amount_per_period: \"15\"\n";
        let parsed: LoanRequest = parse_piped(text).unwrap().unwrap();
        assert_eq!(parsed.term, 57);
        assert_eq!(
            parsed.insurance,
            Some(InsuranceSpec::Fixed {
                amount_per_period: Decimal::from(15)
            })
        );
    }

    #[test]
    fn test_malformed_json_names_format() {
        let err = parse_piped::<LoanRequest>("{\"principal\": ").unwrap_err();
        assert!(err.to_string().contains("JSON"), "{err}");
    }
}

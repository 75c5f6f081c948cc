use chempot::core::models::Element;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid chemical potential '{0}'. Expected 'El=value' (e.g., 'O=-1.5').")]
    InvalidChempotFormat(String),

    #[error("Unknown element '{symbol}' in '{input}'.")]
    UnknownElement { symbol: String, input: String },

    #[error("Invalid number '{value}' in '{input}'.")]
    InvalidNumber { value: String, input: String },

    #[error("Invalid --set format: '{0}'. Expected KEY=VALUE.")]
    InvalidSetFormat(String),
}

/// Parses an `El=value` pair such as `O=-1.5`.
pub fn parse_chempot(input: &str) -> Result<(Element, f64), ParseError> {
    let (symbol, value) = input
        .split_once('=')
        .ok_or_else(|| ParseError::InvalidChempotFormat(input.to_string()))?;
    let (symbol, value) = (symbol.trim(), value.trim());
    if symbol.is_empty() || value.is_empty() {
        return Err(ParseError::InvalidChempotFormat(input.to_string()));
    }

    let element = symbol
        .parse::<Element>()
        .map_err(|_| ParseError::UnknownElement {
            symbol: symbol.to_string(),
            input: input.to_string(),
        })?;
    let value = parse_finite(value).ok_or_else(|| ParseError::InvalidNumber {
        value: value.to_string(),
        input: input.to_string(),
    })?;
    Ok((element, value))
}

/// Splits a `KEY=VALUE` override at the first `=`.
pub fn parse_set_value(input: &str) -> Result<(&str, &str), ParseError> {
    match input.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value.trim())),
        _ => Err(ParseError::InvalidSetFormat(input.to_string())),
    }
}

pub fn parse_finite(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_chempot_accepts_valid_pairs() {
        let (element, value) = parse_chempot("O=-1.5").unwrap();
        assert_eq!(element.symbol(), "O");
        assert_eq!(value, -1.5);

        let (element, value) = parse_chempot(" Nb = 0 ").unwrap();
        assert_eq!(element.symbol(), "Nb");
        assert_eq!(value, 0.0);
    }

    #[test]
    fn parse_chempot_rejects_missing_parts() {
        for input in ["O", "=1.0", "O=", ""] {
            assert_eq!(
                parse_chempot(input),
                Err(ParseError::InvalidChempotFormat(input.to_string()))
            );
        }
    }

    #[test]
    fn parse_chempot_rejects_unknown_elements() {
        assert_eq!(
            parse_chempot("Xx=1"),
            Err(ParseError::UnknownElement {
                symbol: "Xx".to_string(),
                input: "Xx=1".to_string()
            })
        );
    }

    #[test]
    fn parse_chempot_rejects_non_finite_numbers() {
        for input in ["O=abc", "O=NaN", "O=inf"] {
            assert!(matches!(
                parse_chempot(input),
                Err(ParseError::InvalidNumber { .. })
            ));
        }
    }

    #[test]
    fn parse_set_value_splits_at_first_equals() {
        assert_eq!(
            parse_set_value("reservoirs.O-rich.O=0"),
            Ok(("reservoirs.O-rich.O", "0"))
        );
        assert_eq!(parse_set_value("a=b=c"), Ok(("a", "b=c")));
        assert_eq!(
            parse_set_value("novalue"),
            Err(ParseError::InvalidSetFormat("novalue".to_string()))
        );
        assert!(parse_set_value("=1").is_err());
    }
}

const CM_PER_INCH: f64 = 2.54;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UnitParseError {
    #[error("malformed height \"{0}\" (expected F'II\")")]
    Height(String),
    #[error("malformed weight \"{0}\" (expected NNNlbs)")]
    Weight(String),
    #[error("malformed amount \"{0}\" (expected €N, €NK or €NM)")]
    Money(String),
}

/// `5'11"` -> 180.34
pub fn parse_height_cm(raw: &str) -> Result<f64, UnitParseError> {
    let err = || UnitParseError::Height(raw.to_string());
    let (feet, inches) = raw.trim().split_once('\'').ok_or_else(err)?;
    let feet = feet.trim().parse::<u32>().map_err(|_| err())?;
    let inches = inches
        .trim()
        .trim_end_matches('"')
        .trim()
        .parse::<u32>()
        .map_err(|_| err())?;
    let total = feet
        .checked_mul(12)
        .and_then(|v| v.checked_add(inches))
        .ok_or_else(err)?;
    Ok(f64::from(total) * CM_PER_INCH)
}

pub fn parse_weight_lbs(raw: &str) -> Result<f64, UnitParseError> {
    let err = || UnitParseError::Weight(raw.to_string());
    let number = raw.trim().strip_suffix("lbs").ok_or_else(err)?;
    parse_finite(number).ok_or_else(err)
}

/// Wage/value/release clause amounts: `€100K`, `€1.5M`, `€500`.
pub fn parse_euros(raw: &str) -> Result<f64, UnitParseError> {
    let err = || UnitParseError::Money(raw.to_string());
    let body = raw.trim();
    let body = body.strip_prefix('€').unwrap_or(body);
    let (number, multiplier) = if let Some(n) = body.strip_suffix('K') {
        (n, 1_000.0)
    } else if let Some(n) = body.strip_suffix('M') {
        (n, 1_000_000.0)
    } else {
        (body, 1.0)
    };
    let value = parse_finite(number).ok_or_else(err)?;
    Ok(value * multiplier)
}

fn parse_finite(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height_to_centimetres() {
        assert!((parse_height_cm("5'11\"").unwrap() - 180.34).abs() < 1e-9);
        assert!((parse_height_cm("6'0\"").unwrap() - 182.88).abs() < 1e-9);
        assert!((parse_height_cm("5'7").unwrap() - 170.18).abs() < 1e-9);
    }

    #[test]
    fn malformed_height_is_an_error() {
        assert_eq!(
            parse_height_cm("180cm"),
            Err(UnitParseError::Height("180cm".to_string()))
        );
        assert!(parse_height_cm("5'x\"").is_err());
        assert!(parse_height_cm("").is_err());
    }

    #[test]
    fn oversized_height_is_an_error() {
        assert_eq!(
            parse_height_cm("400000000'0\""),
            Err(UnitParseError::Height("400000000'0\"".to_string()))
        );
        assert!(parse_height_cm("5'4294967295\"").is_err());
    }

    #[test]
    fn weight_strips_pounds_suffix() {
        assert_eq!(parse_weight_lbs("159lbs"), Ok(159.0));
        assert!(parse_weight_lbs("72kg").is_err());
        assert!(parse_weight_lbs("lbs").is_err());
    }

    #[test]
    fn euro_suffix_multipliers() {
        assert_eq!(parse_euros("€100K"), Ok(100_000.0));
        assert_eq!(parse_euros("€1.5M"), Ok(1_500_000.0));
        assert_eq!(parse_euros("€500"), Ok(500.0));
        assert_eq!(parse_euros("€0"), Ok(0.0));
    }

    #[test]
    fn malformed_amount_is_an_error() {
        assert!(parse_euros("€").is_err());
        assert!(parse_euros("€1.2B").is_err());
        assert!(parse_euros("free").is_err());
    }
}

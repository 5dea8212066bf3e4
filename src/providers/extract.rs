//! Response body parsing shared by all HTTP providers

use crate::{constants::MISSING_VALUE_SENTINELS, error::ProviderError, types::ResponseFormat};
use serde_json::Value;

/// Extracts one finite number from a response body
///
/// Well-formed finite values are returned as-is, without rounding or
/// unit conversion.
pub fn extract_value(format: &ResponseFormat, body: &str) -> Result<f64, ProviderError> {
    match format {
        ResponseFormat::Json { path } => extract_json(body, path),
        ResponseFormat::Csv { column } => extract_csv(body, column),
        ResponseFormat::QuotedList { index } => extract_quoted_list(body, *index),
    }
}

fn extract_json(body: &str, path: &str) -> Result<f64, ProviderError> {
    let root: Value = serde_json::from_str(body)
        .map_err(|e| ProviderError::invalid_response(format!("Failed to parse JSON: {}", e)))?;

    let mut current = &root;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        current = next.ok_or_else(|| ProviderError::missing_field(path))?;
    }

    match current {
        Value::Number(n) => {
            let value = n
                .as_f64()
                .ok_or_else(|| ProviderError::invalid_response(format!("{} is not an f64", n)))?;
            ensure_finite(value)
        }
        Value::String(s) => parse_numeric_text(s, path),
        Value::Null => Err(ProviderError::missing_field(path)),
        other => Err(ProviderError::invalid_response(format!(
            "{} is not numeric: {}",
            path, other
        ))),
    }
}

fn extract_csv(body: &str, column: &str) -> Result<f64, ProviderError> {
    if body.trim().is_empty() {
        return Err(ProviderError::invalid_response("Empty CSV body"));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ProviderError::invalid_response(format!("Failed to read CSV header: {}", e)))?
        .clone();

    // Error pages and rate-limit notices come back as a single text field
    if headers.len() < 2 {
        return Err(ProviderError::invalid_response(format!(
            "Not a CSV header: {:?}",
            headers.get(0).unwrap_or_default()
        )));
    }

    let idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(column))
        .ok_or_else(|| ProviderError::missing_field(column))?;

    let record = reader
        .records()
        .next()
        .ok_or_else(|| ProviderError::invalid_response("CSV has no data rows"))?
        .map_err(|e| ProviderError::invalid_response(format!("Failed to read CSV row: {}", e)))?;

    let raw = record
        .get(idx)
        .ok_or_else(|| ProviderError::missing_field(column))?;

    parse_numeric_text(raw, column)
}

fn extract_quoted_list(body: &str, index: usize) -> Result<f64, ProviderError> {
    let start = body
        .find('"')
        .ok_or_else(|| ProviderError::invalid_response("No quoted payload"))?;
    let rest = &body[start + 1..];
    let end = rest
        .find('"')
        .ok_or_else(|| ProviderError::invalid_response("Unterminated quoted payload"))?;

    let locator = format!("field #{}", index);
    let raw = rest[..end]
        .split(',')
        .nth(index)
        .ok_or_else(|| ProviderError::missing_field(locator.clone()))?;

    parse_numeric_text(raw, &locator)
}

/// Parses a textual number, mapping sentinels to `MissingField`
fn parse_numeric_text(raw: &str, locator: &str) -> Result<f64, ProviderError> {
    let text = raw.trim();
    let lowered = text.to_ascii_lowercase();
    if text.is_empty() || MISSING_VALUE_SENTINELS.contains(&lowered.as_str()) {
        return Err(ProviderError::missing_field(locator));
    }

    let value = text.parse::<f64>().map_err(|_| {
        ProviderError::invalid_response(format!("{} is not a number: {:?}", locator, text))
    })?;

    ensure_finite(value)
}

fn ensure_finite(value: f64) -> Result<f64, ProviderError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ProviderError::NonFinite(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    fn kind(result: Result<f64, ProviderError>) -> FailureKind {
        result.unwrap_err().kind()
    }

    #[test]
    fn test_json_nested_path() {
        let body = r#"{"success":true,"base":"USD","rates":{"CNY":7.1835,"EUR":0.9213}}"#;
        let format = ResponseFormat::json("rates.CNY");
        assert_eq!(extract_value(&format, body).unwrap(), 7.1835);
    }

    #[test]
    fn test_json_array_index_and_numeric_string() {
        let body = r#"{"quoteResponse":{"result":[{"symbol":"^HSI","regularMarketPrice":"17654.32"}]}}"#;
        let format = ResponseFormat::json("quoteResponse.result.0.regularMarketPrice");
        assert_eq!(extract_value(&format, body).unwrap(), 17654.32);
    }

    #[test]
    fn test_json_missing_and_null_fields() {
        let format = ResponseFormat::json("rates.CNY");
        assert_eq!(
            kind(extract_value(&format, r#"{"rates":{"EUR":0.92}}"#)),
            FailureKind::MissingField
        );
        assert_eq!(
            kind(extract_value(&format, r#"{"rates":{"CNY":null}}"#)),
            FailureKind::MissingField
        );
        assert_eq!(
            kind(extract_value(&format, r#"{"rates":{"CNY":"not available"}}"#)),
            FailureKind::MissingField
        );

        let format = ResponseFormat::json("quoteResponse.result.0.regularMarketPrice");
        assert_eq!(
            kind(extract_value(&format, r#"{"quoteResponse":{"result":[]}}"#)),
            FailureKind::MissingField
        );
    }

    #[test]
    fn test_json_parse_errors() {
        let format = ResponseFormat::json("result");
        assert_eq!(
            kind(extract_value(&format, "<html>rate limited</html>")),
            FailureKind::ParseError
        );
        assert_eq!(
            kind(extract_value(&format, r#"{"result":{"value":1}}"#)),
            FailureKind::ParseError
        );
        assert_eq!(
            kind(extract_value(&format, r#"{"result":"abc"}"#)),
            FailureKind::ParseError
        );
    }

    #[test]
    fn test_json_non_finite_string() {
        let format = ResponseFormat::json("result");
        assert_eq!(
            kind(extract_value(&format, r#"{"result":"NaN"}"#)),
            FailureKind::NonFinite
        );
        assert_eq!(
            kind(extract_value(&format, r#"{"result":"inf"}"#)),
            FailureKind::NonFinite
        );
    }

    #[test]
    fn test_csv_close_column() {
        let body = "Symbol,Date,Time,Open,High,Low,Close,Volume\r\n\
                    CL.F,2026-10-16,22:59:58,71.02,71.88,70.41,71.37,301245\r\n";
        let format = ResponseFormat::csv("Close");
        assert_eq!(extract_value(&format, body).unwrap(), 71.37);

        // header lookup ignores case
        let format = ResponseFormat::csv("close");
        assert_eq!(extract_value(&format, body).unwrap(), 71.37);
    }

    #[test]
    fn test_csv_sentinels_and_shape() {
        let format = ResponseFormat::csv("Close");
        let unknown_symbol = "Symbol,Date,Time,Open,High,Low,Close,Volume\nXXX,N/D,N/D,N/D,N/D,N/D,N/D,N/D\n";
        assert_eq!(
            kind(extract_value(&format, unknown_symbol)),
            FailureKind::MissingField
        );

        let na = "Symbol,Close\nHSI,N/A\n";
        assert_eq!(kind(extract_value(&format, na)), FailureKind::MissingField);

        let no_column = "Symbol,Open\nHSI,17000\n";
        assert_eq!(
            kind(extract_value(&format, no_column)),
            FailureKind::MissingField
        );

        let header_only = "Symbol,Close\n";
        assert_eq!(
            kind(extract_value(&format, header_only)),
            FailureKind::ParseError
        );

        let garbage = "Symbol,Close\nHSI,seventeen\n";
        assert_eq!(kind(extract_value(&format, garbage)), FailureKind::ParseError);

        for not_csv in [
            "",
            "<html><body>Service Unavailable</body></html>",
            "Exceeded the daily hits limit",
        ] {
            assert_eq!(
                kind(extract_value(&format, not_csv)),
                FailureKind::ParseError,
                "body {:?}",
                not_csv
            );
        }
    }

    #[test]
    fn test_quoted_list() {
        let body = "var hq_str_s_sh000001=\"SSE Composite,3087.5310,-12.4461,-0.40,3419872,41234567\";\n";
        let format = ResponseFormat::quoted_list(1);
        assert_eq!(extract_value(&format, body).unwrap(), 3087.531);

        let empty = "var hq_str_s_sh000001=\"\";\n";
        assert_eq!(kind(extract_value(&format, empty)), FailureKind::MissingField);

        assert_eq!(
            kind(extract_value(&format, "Forbidden")),
            FailureKind::ParseError
        );
    }

    #[test]
    fn test_values_pass_through_unchanged() {
        for value in [0.000123, 1.0, 7.2501, 2387.45, 123456.789] {
            let body = format!(r#"{{"result":{}}}"#, value);
            let parsed = extract_value(&ResponseFormat::json("result"), &body).unwrap();
            assert_eq!(parsed, value);
        }
    }
}

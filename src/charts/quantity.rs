/// Weight used when a quantity string contains no recognizable number.
pub const FALLBACK_WEIGHT: f64 = 1.0;

/// Outcome of scanning a free-form quantity string.
///
/// `Fallback` is a real branch, not a silent default: pie slices for
/// quantities like "a pinch" weigh [`FALLBACK_WEIGHT`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedQuantity {
    Number(f64),
    Fallback,
}

impl ParsedQuantity {
    pub fn weight(self) -> f64 {
        match self {
            ParsedQuantity::Number(v) => v,
            ParsedQuantity::Fallback => FALLBACK_WEIGHT,
        }
    }
}

/// Finds the first simple fraction (`digits/digits`) or plain number
/// (`digits[.digits]`) in `raw`, tolerating arbitrary surrounding text:
/// "about 2/3 cup" parses as two thirds, "3.5 oz" as 3.5. A fraction with a
/// zero denominator counts as malformed and falls back.
pub fn parse_quantity(raw: &str) -> ParsedQuantity {
    let bytes = raw.as_bytes();
    let Some(start) = bytes.iter().position(|b| b.is_ascii_digit()) else {
        return ParsedQuantity::Fallback;
    };

    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }

    // digits '/' digits: the slash must directly follow the run and be
    // directly followed by a digit, so "1 / 2" reads as the number 1
    if end + 1 < bytes.len() && bytes[end] == b'/' && bytes[end + 1].is_ascii_digit() {
        let mut den_end = end + 1;
        while den_end < bytes.len() && bytes[den_end].is_ascii_digit() {
            den_end += 1;
        }
        let numerator = match raw[start..end].parse::<f64>() {
            Ok(v) => v,
            Err(_) => return ParsedQuantity::Fallback,
        };
        let denominator = match raw[end + 1..den_end].parse::<f64>() {
            Ok(v) => v,
            Err(_) => return ParsedQuantity::Fallback,
        };
        if denominator == 0.0 {
            return ParsedQuantity::Fallback;
        }
        return ParsedQuantity::Number(numerator / denominator);
    }

    // optional fractional part: digits '.' digits*
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }

    match raw[start..end].parse::<f64>() {
        Ok(v) => ParsedQuantity::Number(v),
        Err(_) => ParsedQuantity::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_integer_with_unit() {
        assert_eq!(parse_quantity("2 cups"), ParsedQuantity::Number(2.0));
    }

    #[test]
    fn simple_fraction() {
        assert_eq!(parse_quantity("1/4 tsp"), ParsedQuantity::Number(0.25));
    }

    #[test]
    fn decimal_with_leading_text() {
        assert_eq!(parse_quantity("about 3.5 oz"), ParsedQuantity::Number(3.5));
    }

    #[test]
    fn no_number_falls_back() {
        assert_eq!(parse_quantity("a pinch"), ParsedQuantity::Fallback);
        assert_eq!(parse_quantity("a pinch").weight(), 1.0);
        assert_eq!(parse_quantity(""), ParsedQuantity::Fallback);
    }

    #[test]
    fn fraction_embedded_in_text() {
        assert_eq!(parse_quantity("about 2/3 cup"), ParsedQuantity::Number(2.0 / 3.0));
    }

    #[test]
    fn spaced_slash_is_not_a_fraction() {
        // only digits/digits forms a fraction; "1 / 2" reads as 1
        assert_eq!(parse_quantity("1 / 2 cup"), ParsedQuantity::Number(1.0));
    }

    #[test]
    fn slash_without_denominator_reads_the_numerator() {
        assert_eq!(parse_quantity("1/x"), ParsedQuantity::Number(1.0));
    }

    #[test]
    fn zero_denominator_falls_back() {
        assert_eq!(parse_quantity("1/0 cup"), ParsedQuantity::Fallback);
    }

    #[test]
    fn first_number_wins() {
        assert_eq!(parse_quantity("2 to 3 cups"), ParsedQuantity::Number(2.0));
        assert_eq!(parse_quantity("2.5.3"), ParsedQuantity::Number(2.5));
    }

    #[test]
    fn bare_leading_dot_reads_trailing_digits() {
        // ".5" has no leading digit, so the scan lands on the 5
        assert_eq!(parse_quantity(".5 cup"), ParsedQuantity::Number(5.0));
    }

    #[test]
    fn trailing_dot_is_tolerated() {
        assert_eq!(parse_quantity("2. cups"), ParsedQuantity::Number(2.0));
    }

    #[test]
    fn multi_digit_fraction() {
        assert_eq!(parse_quantity("10/4"), ParsedQuantity::Number(2.5));
    }
}

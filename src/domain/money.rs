use thiserror::Error;

/// Amounts and balances in minor units (cents of the account currency).
pub type Cents = i64;

/// Interest rates are percentages with two decimals, held as basis points.
/// Example: "2.35" (percent) -> 235
pub type BasisPoints = i64;

/// Two-decimal rendering used by the tables and JSON output. -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let (whole, frac) = (cents.unsigned_abs() / 100, cents.unsigned_abs() % 100);
    if cents < 0 {
        format!("-{whole}.{frac:02}")
    } else {
        format!("{whole}.{frac:02}")
    }
}

/// Read a decimal amount such as `"1500"`, `"12.5"` or `"-0.01"` into cents.
///
/// More than two decimal places is an error, so stored values never lose precision.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let text = input.trim();
    let (negative, text) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let (whole, frac) = text.split_once('.').unwrap_or((text, ""));
    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !digits(whole) || !digits(frac) {
        return Err(ParseCentsError::InvalidFormat);
    }
    if frac.len() > 2 {
        return Err(ParseCentsError::TooManyDecimals);
    }

    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| ParseCentsError::InvalidFormat)?
    };
    let frac = frac
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(2)
        .fold(0, |acc, b| acc * 10 + i64::from(b - b'0'));

    let cents = whole
        .checked_mul(100)
        .and_then(|c| c.checked_add(frac))
        .ok_or(ParseCentsError::OutOfRange)?;
    Ok(if negative { -cents } else { cents })
}

/// Format a rate in basis points as a percentage string. 235 -> "2.35"
pub fn format_rate(rate: BasisPoints) -> String {
    format_cents(rate)
}

/// Parse a percentage string into basis points. "0.0" -> 0, "2.35" -> 235
pub fn parse_rate(input: &str) -> Result<BasisPoints, ParseCentsError> {
    parse_cents(input)
}

/// Convert a floating-point unit amount (as sent by JSON clients) into cents.
pub fn cents_from_units(units: f64) -> Result<Cents, ParseCentsError> {
    if !units.is_finite() {
        return Err(ParseCentsError::InvalidFormat);
    }
    let cents = (units * 100.0).round();
    if cents.abs() >= i64::MAX as f64 {
        return Err(ParseCentsError::OutOfRange);
    }
    Ok(cents as Cents)
}

/// Take a whole-number percentage of an amount, rounding half away from zero.
/// `None` if the intermediate product overflows.
pub fn percent_of(amount: Cents, percent: i64) -> Option<Cents> {
    let scaled = amount.checked_mul(percent)?;
    let rounded = if scaled >= 0 {
        scaled.checked_add(50)?
    } else {
        scaled.checked_sub(50)?
    };
    Some(rounded / 100)
}

/// Sum amounts, or `None` once the total leaves the `Cents` range.
pub fn checked_total<I: IntoIterator<Item = Cents>>(amounts: I) -> Option<Cents> {
    amounts
        .into_iter()
        .try_fold(0 as Cents, |total, amount| total.checked_add(amount))
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseCentsError {
    #[error("not a decimal amount")]
    InvalidFormat,
    #[error("more than two decimal places")]
    TooManyDecimals,
    #[error("amount does not fit in cents")]
    OutOfRange,
}

/// Serde adapter writing cents as a two-decimal string and accepting either
/// a string or a JSON number on the way back in.
pub mod cents_str {
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::{Cents, cents_from_units, format_cents, parse_cents};

    pub fn serialize<S: Serializer>(cents: &Cents, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_cents(*cents))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Cents, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(f64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => parse_cents(&s).map_err(de::Error::custom),
            Raw::Number(n) => cents_from_units(n).map_err(de::Error::custom),
        }
    }
}

/// Same as [`cents_str`] for optional amounts.
pub mod option_cents_str {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{Cents, format_cents};

    pub fn serialize<S: Serializer>(
        cents: &Option<Cents>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match cents {
            Some(c) => serializer.serialize_some(&format_cents(*c)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Cents>, D::Error> {
        #[derive(Deserialize)]
        struct Wrapper(#[serde(with = "super::cents_str")] Cents);

        Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(c)| c))
    }
}

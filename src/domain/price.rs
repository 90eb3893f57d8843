//! Monetary price value type.
//!
//! Prices are held as integral minor units (hundredths) so arithmetic and
//! storage never touch floating point. The wire format is a 2-place decimal
//! string; deserialization also accepts bare JSON numbers.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const MINOR_UNITS_PER_WHOLE: i64 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceError {
    #[error("price is empty")]
    EmptyInput,
    #[error("price `{input}` is not a decimal number")]
    Malformed { input: String },
    #[error("price `{input}` has more than two fractional digits")]
    TooPrecise { input: String },
    #[error("price `{input}` is negative")]
    Negative { input: String },
    #[error("price `{input}` is out of range")]
    Overflow { input: String },
}

impl PriceError {
    fn malformed(input: &str) -> Self {
        Self::Malformed {
            input: input.to_string(),
        }
    }
}

/// A non-negative amount with two decimal places of precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(i64);

impl Price {
    pub const ZERO: Price = Price(0);

    pub fn from_minor_units(minor: i64) -> Self {
        Self(minor)
    }

    pub fn minor_units(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02}",
            self.0 / MINOR_UNITS_PER_WHOLE,
            self.0 % MINOR_UNITS_PER_WHOLE
        )
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(PriceError::EmptyInput);
        }
        if trimmed.starts_with('-') {
            return Err(PriceError::Negative {
                input: trimmed.to_string(),
            });
        }

        let (whole_part, fraction_part) = match trimmed.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (trimmed, ""),
        };

        if fraction_part.len() > 2 {
            return Err(PriceError::TooPrecise {
                input: trimmed.to_string(),
            });
        }
        if whole_part.is_empty() && fraction_part.is_empty() {
            return Err(PriceError::malformed(trimmed));
        }
        if !whole_part.chars().all(|c| c.is_ascii_digit())
            || !fraction_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(PriceError::malformed(trimmed));
        }

        let whole: i64 = if whole_part.is_empty() {
            0
        } else {
            whole_part
                .parse()
                .map_err(|_| PriceError::Overflow {
                    input: trimmed.to_string(),
                })?
        };

        let fraction: i64 = match fraction_part.len() {
            0 => 0,
            1 => fraction_part.parse::<i64>().expect("ascii digit") * 10,
            _ => fraction_part.parse::<i64>().expect("ascii digits"),
        };

        whole
            .checked_mul(MINOR_UNITS_PER_WHOLE)
            .and_then(|minor| minor.checked_add(fraction))
            .map(Price)
            .ok_or_else(|| PriceError::Overflow {
                input: trimmed.to_string(),
            })
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct PriceVisitor;

impl Visitor<'_> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a decimal string or number with at most two fractional digits")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Price, E> {
        value.parse().map_err(de::Error::custom)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Price, E> {
        i64::try_from(value)
            .ok()
            .and_then(|whole| whole.checked_mul(MINOR_UNITS_PER_WHOLE))
            .map(Price)
            .ok_or_else(|| de::Error::custom("price is out of range"))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Price, E> {
        if value < 0 {
            return Err(de::Error::custom("price is negative"));
        }
        value
            .checked_mul(MINOR_UNITS_PER_WHOLE)
            .map(Price)
            .ok_or_else(|| de::Error::custom("price is out of range"))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Price, E> {
        if !value.is_finite() || value < 0.0 {
            return Err(de::Error::custom("price must be a finite non-negative number"));
        }
        let scaled = value * MINOR_UNITS_PER_WHOLE as f64;
        let rounded = scaled.round();
        if (scaled - rounded).abs() > 1e-6 {
            return Err(de::Error::custom(
                "price has more than two fractional digits",
            ));
        }
        if rounded > i64::MAX as f64 {
            return Err(de::Error::custom("price is out of range"));
        }
        Ok(Price(rounded as i64))
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Price, D::Error> {
        deserializer.deserialize_any(PriceVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_and_fractional_inputs() {
        assert_eq!("12.50".parse::<Price>(), Ok(Price::from_minor_units(1250)));
        assert_eq!("12.5".parse::<Price>(), Ok(Price::from_minor_units(1250)));
        assert_eq!("180".parse::<Price>(), Ok(Price::from_minor_units(18000)));
        assert_eq!("0.05".parse::<Price>(), Ok(Price::from_minor_units(5)));
        assert_eq!(".5".parse::<Price>(), Ok(Price::from_minor_units(50)));
    }

    #[test]
    fn rejects_bad_inputs() {
        assert_eq!("".parse::<Price>(), Err(PriceError::EmptyInput));
        assert!(matches!(
            "12.505".parse::<Price>(),
            Err(PriceError::TooPrecise { .. })
        ));
        assert!(matches!(
            "-3".parse::<Price>(),
            Err(PriceError::Negative { .. })
        ));
        assert!(matches!(
            "12,50".parse::<Price>(),
            Err(PriceError::Malformed { .. })
        ));
        assert!(matches!(
            ".".parse::<Price>(),
            Err(PriceError::Malformed { .. })
        ));
    }

    #[test]
    fn displays_two_decimal_places() {
        assert_eq!(Price::from_minor_units(1250).to_string(), "12.50");
        assert_eq!(Price::from_minor_units(18000).to_string(), "180.00");
        assert_eq!(Price::ZERO.to_string(), "0.00");
        assert_eq!(Price::from_minor_units(5).to_string(), "0.05");
    }

    #[test]
    fn serde_round_trip_as_string() {
        let price: Price = serde_json::from_str("\"251.50\"").expect("string price");
        assert_eq!(price, Price::from_minor_units(25150));
        assert_eq!(serde_json::to_string(&price).expect("json"), "\"251.50\"");
    }

    #[test]
    fn deserializes_json_numbers() {
        let price: Price = serde_json::from_str("12.5").expect("float price");
        assert_eq!(price, Price::from_minor_units(1250));

        let price: Price = serde_json::from_str("200").expect("integer price");
        assert_eq!(price, Price::from_minor_units(20000));

        assert!(serde_json::from_str::<Price>("12.505").is_err());
        assert!(serde_json::from_str::<Price>("-1").is_err());
    }
}

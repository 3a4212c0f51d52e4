use serde::{Deserialize, Serialize};
use shared::domain::{DEFAULT_MAX_PRICE, DEFAULT_MIN_PRICE, MAX_PRICE_OPTIONS, MIN_PRICE_OPTIONS};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("price value {raw:?} is not a number")]
    NotANumber { raw: String },
    #[error("{bound} price {value} is not one of the offered values")]
    OutOfDomain { bound: PriceBound, value: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceBound {
    Min,
    Max,
}

impl PriceBound {
    pub fn options(self) -> &'static [u32] {
        match self {
            PriceBound::Min => &MIN_PRICE_OPTIONS,
            PriceBound::Max => &MAX_PRICE_OPTIONS,
        }
    }

    fn check(self, value: u32) -> Result<u32, PriceError> {
        if self.options().contains(&value) {
            Ok(value)
        } else {
            Err(PriceError::OutOfDomain { bound: self, value })
        }
    }

    fn parse(self, raw: &str) -> Result<u32, PriceError> {
        let value = raw
            .trim()
            .parse::<u32>()
            .map_err(|_| PriceError::NotANumber {
                raw: raw.to_string(),
            })?;
        self.check(value)
    }
}

impl std::fmt::Display for PriceBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceBound::Min => f.write_str("minimum"),
            PriceBound::Max => f.write_str("maximum"),
        }
    }
}

/// The two bounds move independently; `min <= max` is a validation rule,
/// not a mutation-time invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    min: u32,
    max: u32,
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_PRICE,
            max: DEFAULT_MAX_PRICE,
        }
    }
}

impl PriceRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    #[must_use]
    pub fn with_min(self, min: u32) -> Self {
        Self { min, ..self }
    }

    #[must_use]
    pub fn with_max(self, max: u32) -> Self {
        Self { max, ..self }
    }

    /// Accepts the raw value of the minimum select control. Only values the
    /// control actually offers are accepted.
    pub fn parse_min(self, raw: &str) -> Result<Self, PriceError> {
        Ok(Self {
            min: PriceBound::Min.parse(raw)?,
            ..self
        })
    }

    pub fn parse_max(self, raw: &str) -> Result<Self, PriceError> {
        Ok(Self {
            max: PriceBound::Max.parse(raw)?,
            ..self
        })
    }

    /// Whether both bounds are values the controls offer.
    pub fn in_domain(&self) -> bool {
        PriceBound::Min.check(self.min).is_ok() && PriceBound::Max.check(self.max).is_ok()
    }

    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }
}

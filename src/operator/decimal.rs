use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::ValueOperator;

/// How a decimal sum is brought back to the configured scale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Ties round away from zero.
    #[default]
    HalfUp,
    /// Ties round to the even neighbour (banker's rounding).
    HalfEven,
    /// Ties round towards zero.
    HalfDown,
    Up,
    Down,
    Ceiling,
    Floor,
}

impl RoundingMode {
    pub fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
            RoundingMode::HalfDown => RoundingStrategy::MidpointTowardZero,
            RoundingMode::Up => RoundingStrategy::AwayFromZero,
            RoundingMode::Down => RoundingStrategy::ToZero,
            RoundingMode::Ceiling => RoundingStrategy::ToPositiveInfinity,
            RoundingMode::Floor => RoundingStrategy::ToNegativeInfinity,
        }
    }
}

/// Scale and rounding applied after every decimal addition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecimalConfig {
    #[serde(default = "DecimalConfig::default_scale")]
    pub scale: u32,
    #[serde(default)]
    pub rounding: RoundingMode,
}

impl DecimalConfig {
    /// Two decimal places, ties away from zero.
    pub const DEFAULT: DecimalConfig = DecimalConfig {
        scale: 2,
        rounding: RoundingMode::HalfUp,
    };

    /// Two decimal places with banker's rounding.
    pub const CURRENCY: DecimalConfig = DecimalConfig {
        scale: 2,
        rounding: RoundingMode::HalfEven,
    };

    pub const HIGH_PRECISION: DecimalConfig = DecimalConfig {
        scale: 8,
        rounding: RoundingMode::HalfUp,
    };

    pub fn new(scale: u32, rounding: RoundingMode) -> Self {
        Self { scale, rounding }
    }

    fn default_scale() -> u32 {
        Self::DEFAULT.scale
    }

    /// Rounds `value` to the configured scale and pads it so the scale is exact.
    pub fn apply(&self, value: Decimal) -> Decimal {
        let mut rounded = value.round_dp_with_strategy(self.scale, self.rounding.strategy());
        rounded.rescale(self.scale);
        rounded
    }
}

impl Default for DecimalConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Fixed-scale decimal addition. Sums beyond the representable range
/// saturate at `Decimal::MAX` or `Decimal::MIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalOperator {
    config: DecimalConfig,
    zero: Decimal,
}

impl DecimalOperator {
    pub fn new(config: DecimalConfig) -> Self {
        let mut zero = Decimal::ZERO;
        zero.rescale(config.scale);
        Self { config, zero }
    }

    pub fn with_scale(scale: u32) -> Self {
        Self::new(DecimalConfig {
            scale,
            ..DecimalConfig::DEFAULT
        })
    }

    pub fn currency() -> Self {
        Self::new(DecimalConfig::CURRENCY)
    }

    pub fn config(&self) -> DecimalConfig {
        self.config
    }
}

impl Default for DecimalOperator {
    fn default() -> Self {
        Self::new(DecimalConfig::DEFAULT)
    }
}

impl ValueOperator<Decimal> for DecimalOperator {
    fn identity(&self) -> Decimal {
        self.zero
    }

    fn combine(&self, a: Decimal, b: Decimal) -> Decimal {
        self.config.apply(a.saturating_add(b))
    }
}

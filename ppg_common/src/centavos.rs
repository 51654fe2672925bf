use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const BRL_CURRENCY_CODE: &str = "BRL";
pub const BRL_CURRENCY_CODE_LOWER: &str = "brl";

//--------------------------------------     Centavos       ----------------------------------------------------------
/// A monetary amount in Brazilian centavos (the minor currency unit of the Real).
///
/// Every amount that crosses the gateway -- order totals, line item prices, charge amounts, fees -- is an integer
/// number of centavos, so floating point rounding never enters the picture.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Centavos(i64);

op!(binary Centavos, Add, add);
op!(binary Centavos, Sub, sub);
op!(inplace Centavos, SubAssign, sub_assign);
op!(unary Centavos, Neg, neg);

impl Mul<i64> for Centavos {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Centavos {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in centavos: {0}")]
pub struct CentavosConversionError(String);

impl From<i64> for Centavos {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Centavos {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Centavos {}

impl TryFrom<u64> for Centavos {
    type Error = CentavosConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(CentavosConversionError(format!("Value {} is too large to convert to centavos", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Centavos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{sign}R${},{:02}", abs / 100, abs % 100)
    }
}

impl Centavos {
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Overflow-aware multiplication, for amounts built from untrusted input.
    pub fn checked_mul(self, rhs: i64) -> Option<Self> {
        self.0.checked_mul(rhs).map(Self)
    }

    /// Overflow-aware addition, for amounts built from untrusted input.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn from_reais(reais: i64) -> Self {
        Self(reais * 100)
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use bigdecimal::BigDecimal;
use num::BigInt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub enum Number {
    Integer(BigInt),
    Float(f64),
    /// Exact decimal, written with a trailing `M`
    Decimal(BigDecimal),
}

// Floats compare and hash by bit pattern, so that numbers can be set
// members: NaN equals itself, 0.0 and -0.0 differ.
impl PartialEq for Number {
    fn eq(&self, other: &Number) -> bool {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => a.to_bits() == b.to_bits(),
            (Number::Decimal(a), Number::Decimal(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Number::Integer(n) => n.hash(state),
            Number::Float(x) => x.to_bits().hash(state),
            Number::Decimal(d) => d.hash(state),
        }
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        match self {
            Number::Integer(n) => f.write_fmt(format_args!("{}", n)),
            Number::Float(x) => {
                if x.is_nan() {
                    f.write_str("##NaN")
                } else if x.is_infinite() {
                    f.write_str(if *x > 0.0 { "##Inf" } else { "##-Inf" })
                } else {
                    // Debug keeps a '.' or an exponent, so the text
                    // reads back as a float, not an integer.
                    f.write_fmt(format_args!("{:?}", x))
                }
            }
            Number::Decimal(d) => f.write_fmt(format_args!("{}M", d)),
        }
    }
}

macro_rules! from_int {
    ( $($t:ty)* ) => {
        $(
            impl From<$t> for Number {
                fn from(n: $t) -> Number {
                    Number::Integer(BigInt::from(n))
                }
            }
        )*
    }
}

from_int! { i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 isize usize }

impl From<BigInt> for Number {
    fn from(n: BigInt) -> Number {
        Number::Integer(n)
    }
}

impl From<f64> for Number {
    fn from(x: f64) -> Number {
        Number::Float(x)
    }
}

impl From<BigDecimal> for Number {
    fn from(d: BigDecimal) -> Number {
        Number::Decimal(d)
    }
}

/// Convert the raw text of a numeric token. A trailing `M` makes a
/// decimal, a trailing `N` an integer; otherwise integer syntax is
/// tried first, then float syntax. Returns `None` if the text is
/// neither.
pub fn parse_number(s: &str) -> Option<Number> {
    if let Some(digits) = s.strip_suffix('M') {
        BigDecimal::from_str(digits).ok().map(Number::Decimal)
    } else if let Some(digits) = s.strip_suffix('N') {
        BigInt::from_str(digits).ok().map(Number::Integer)
    } else if let Ok(n) = BigInt::from_str(s) {
        Some(Number::Integer(n))
    } else {
        f64::from_str(s).ok().map(Number::Float)
    }
}

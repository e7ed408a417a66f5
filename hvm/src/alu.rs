// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use num_traits::Zero;

use crate::{
    arch::Value,
    op::{Comp, Jump},
};

impl Comp {
    /// Evaluates this computation. `y` is the address register for register
    /// forms and the addressed data-store cell for memory forms; callers pick
    /// it with [`Comp::references_memory`].
    ///
    /// All arithmetic wraps at 16 bits.
    pub fn compute(self, d: Value, y: Value) -> Value {
        match self {
            Self::Zero => 0,
            Self::One => 1,
            Self::MinusOne => -1,
            Self::D => d,
            Self::A | Self::M => y,
            Self::NotD => !d,
            Self::NotA | Self::NotM => !y,
            Self::NegD => d.wrapping_neg(),
            Self::NegA | Self::NegM => y.wrapping_neg(),
            Self::DPlusOne => d.wrapping_add(1),
            Self::APlusOne | Self::MPlusOne => y.wrapping_add(1),
            Self::DMinusOne => d.wrapping_sub(1),
            Self::AMinusOne => y.wrapping_sub(1),
            Self::DPlusA | Self::DPlusM => d.wrapping_add(y),
            Self::DMinusA | Self::DMinusM => d.wrapping_sub(y),
            Self::AMinusD | Self::MMinusD => y.wrapping_sub(d),
            Self::DAndA | Self::DAndM => d & y,
            Self::DOrA | Self::DOrM => d | y,
        }
    }
}

impl Jump {
    /// Whether a jump is taken for the freshly computed `value`.
    pub fn holds(self, value: Value) -> bool {
        match self {
            Self::Never => false,
            Self::Gt => value.is_positive(),
            Self::Eq => value.is_zero(),
            Self::Ge => !value.is_negative(),
            Self::Lt => value.is_negative(),
            Self::Ne => !value.is_zero(),
            Self::Le => !value.is_positive(),
            Self::Always => true,
        }
    }
}

use std::{fmt::Display, ops::Deref};

/// Signed percentage. Progress can go below zero or above a hundred, so unlike most percentages
/// this one isn't clamped.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} %", self.0)
    }
}

impl Percentage {
    pub fn from_ratio(ratio: f64) -> Percentage {
        Percentage(ratio * 100.)
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Share of `whole` that is already done when `left` is still missing. A zero `whole` yields 0%.
pub fn done_percentage(left: f64, whole: f64) -> Percentage {
    if whole == 0. {
        return Percentage(0.);
    }
    Percentage::from_ratio(1. - left / whole)
}

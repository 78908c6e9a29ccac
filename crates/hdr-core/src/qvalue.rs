//! Relative preference weights (`q=0.8`) for list-valued headers.

use std::fmt;

/// A q-factor weight: a value in `[0, 1]` with at most three decimals.
///
/// Stored in thousandths so equality and ordering are exact. An element
/// without a `q` parameter weighs [`QValue::DEFAULT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QValue(u16);

impl QValue {
    /// Implied weight of an element with no `q` parameter.
    pub const DEFAULT: QValue = QValue(1000);
    /// `q=0`, "not acceptable".
    pub const ZERO: QValue = QValue(0);

    /// Parses the wire form: `0`, `1`, `0.x`, `0.xx`, `0.xxx`, `1.0`,
    /// `1.00` or `1.000`. Anything else is rejected.
    pub fn parse(text: &str) -> Option<QValue> {
        let (lead, frac) = match text.split_once('.') {
            Some((lead, frac)) => (lead, Some(frac)),
            None => (text, None),
        };
        let whole: u16 = match lead {
            "0" => 0,
            "1" => 1000,
            _ => return None,
        };
        let frac = match frac {
            None => return Some(QValue(whole)),
            Some(f) => f,
        };
        if frac.is_empty() || frac.len() > 3 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let mut millis = 0u16;
        for b in frac.bytes() {
            millis = millis * 10 + u16::from(b - b'0');
        }
        millis *= 10u16.pow(3 - frac.len() as u32);
        let value = whole + millis;
        if value > 1000 {
            return None;
        }
        Some(QValue(value))
    }

    /// Builds a weight from a float, rejecting anything outside `[0, 1]`.
    /// The value is rounded to the nearest thousandth.
    pub fn from_f32(value: f32) -> Option<QValue> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return None;
        }
        Some(QValue((value * 1000.0).round() as u16))
    }

    pub fn as_f32(self) -> f32 {
        f32::from(self.0) / 1000.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Default for QValue {
    fn default() -> Self {
        QValue::DEFAULT
    }
}

impl fmt::Display for QValue {
    /// Canonical rendering: `1`, `0`, or `0.` followed by up to three
    /// digits with trailing zeros trimmed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            1000 => write!(f, "1"),
            0 => write!(f, "0"),
            millis => {
                let text = format!("0.{:03}", millis);
                write!(f, "{}", text.trim_end_matches('0'))
            }
        }
    }
}

/// Stably sorts `items` by descending weight.
///
/// Elements with equal weight keep their original relative order, which is
/// what lets three unweighted entries come back out in parse order.
pub fn sort_by_weight<T>(items: &mut [T], weight: impl Fn(&T) -> QValue) {
    items.sort_by(|a, b| weight(b).cmp(&weight(a)));
}

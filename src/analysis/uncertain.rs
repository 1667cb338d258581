//! Measured quantities carrying a propagated uncertainty.
//!
//! Every derived metric is built from `(value, error)` pairs where the error
//! is on the scale of one standard deviation. Products and quotients combine
//! *relative* errors additively, the standard first-order approximation.
//! A zero-valued operand makes the relative-error term divide by zero; the
//! non-finite result is propagated as-is and sanitized by the metric engine
//! rather than rejected here.

use serde::Serialize;

/// A measured or derived quantity with a one-standard-deviation uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UncertainValue {
    pub value: f64,
    pub error: f64,
}

impl UncertainValue {
    pub const fn new(value: f64, error: f64) -> Self {
        Self { value, error }
    }

    /// An exact constant: zero error, so it contributes nothing to the
    /// relative error of a product or quotient.
    pub const fn exact(value: f64) -> Self {
        Self { value, error: 0.0 }
    }

    pub fn is_finite(&self) -> bool {
        self.value.is_finite() && self.error.is_finite()
    }

    fn from_relative(value: f64, a: Self, b: Self) -> Self {
        let relative_error = a.error / a.value + b.error / b.value;
        Self {
            value,
            error: value * relative_error,
        }
    }
}

impl std::ops::Mul for UncertainValue {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::from_relative(self.value * rhs.value, self, rhs)
    }
}

impl std::ops::Div for UncertainValue {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        Self::from_relative(self.value / rhs.value, self, rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn divide_combines_relative_errors() {
        let voltage = UncertainValue::new(10.0, 1.0);
        let current = UncertainValue::new(2.0, 0.2);

        let resistance = voltage / current;

        assert_relative_eq!(resistance.value, 5.0);
        // 5.0 * (1/10 + 0.2/2) = 1.0
        assert_relative_eq!(resistance.error, 1.0);
    }

    #[test]
    fn multiply_then_divide_round_trips_the_value() {
        let a = UncertainValue::new(3.7, 0.2);
        let b = UncertainValue::new(0.41, 0.05);

        let round_trip = (a * b) / b;

        assert_relative_eq!(round_trip.value, a.value, max_relative = 1e-12);
    }

    #[test]
    fn round_trip_error_cannot_shrink() {
        let a = UncertainValue::new(3.7, 0.2);
        let b = UncertainValue::new(0.41, 0.05);

        let round_trip = (a * b) / b;

        assert!(round_trip.error / round_trip.value >= a.error / a.value);
    }

    #[test]
    fn exact_constants_contribute_no_relative_error() {
        let a = UncertainValue::new(8.0, 0.4);

        let scaled = a * UncertainValue::exact(100.0);

        assert_relative_eq!(scaled.value, 800.0);
        assert_relative_eq!(scaled.error / scaled.value, a.error / a.value);
    }

    #[test]
    fn zero_valued_operand_yields_non_finite_result() {
        let a = UncertainValue::new(0.0, 0.1);
        let b = UncertainValue::new(2.0, 0.2);

        assert!(!(a / b).is_finite());
        assert!(!(b / a).is_finite());
        assert!(!(a * b).is_finite());
    }
}

//! Evaluation policies. The non-default variants are opt-in.

/// What a `/` does when its right operand is exactly `0.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DivisionByZero {
    /// Divide by `1.0` instead.
    #[default]
    SubstituteOne,
    /// Fail with [`crate::Error::DivisionByZero`].
    Error,
}

/// How aggregates treat text and empty cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NonNumeric {
    /// Read them as `0.0`; they count towards AVER and STDDEV denominators.
    #[default]
    CountAsZero,
    /// Leave them out of the computation. They are still dependencies.
    Skip,
}

/// What MAX and MIN return when no value contributed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyExtremum {
    /// `-inf` for MAX, `+inf` for MIN.
    #[default]
    Infinity,
    /// Fail with [`crate::Error::EmptyRange`].
    Error,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub division_by_zero: DivisionByZero,
    pub non_numeric: NonNumeric,
    pub empty_extremum: EmptyExtremum,
}

impl EngineConfig {
    pub fn with_division_by_zero(mut self, policy: DivisionByZero) -> Self {
        self.division_by_zero = policy;
        self
    }

    pub fn with_non_numeric(mut self, policy: NonNumeric) -> Self {
        self.non_numeric = policy;
        self
    }

    pub fn with_empty_extremum(mut self, policy: EmptyExtremum) -> Self {
        self.empty_extremum = policy;
        self
    }
}

use serde::Serialize;
use thiserror::Error;

/// Share of monthly income available for accommodation; the rest is kept as savings
pub const SPEND_RATIO: f64 = 0.65;

/// Nights in the stay a budget has to cover
pub const STAY_NIGHTS: f64 = 30.0;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum BudgetError {
    #[error("Monthly income is empty")]
    Empty,

    #[error("Monthly income '{0}' is not a number")]
    NotANumber(String),

    #[error("Monthly income must be finite")]
    NotFinite,

    #[error("Monthly income cannot be negative: {0}")]
    Negative(f64),
}

/// A validated, non-negative monthly income
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Income(f64);

impl Income {
    pub fn new(value: f64) -> Result<Self, BudgetError> {
        if !value.is_finite() {
            return Err(BudgetError::NotFinite);
        }
        if value < 0.0 {
            return Err(BudgetError::Negative(value));
        }
        Ok(Self(value))
    }

    /// Parse income as typed by the user
    pub fn parse(text: &str) -> Result<Self, BudgetError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(BudgetError::Empty);
        }
        let value: f64 = trimmed
            .parse()
            .map_err(|_| BudgetError::NotANumber(trimmed.to_string()))?;
        Self::new(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Spending limits derived from an income
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Budget {
    /// What a full 30-night stay may cost
    pub total: f64,
    /// Highest nightly rate worth asking the provider for
    pub daily_ceiling: u64,
}

impl Budget {
    pub fn from_income(income: Income) -> Self {
        let total = income.value() * SPEND_RATIO;
        let daily_ceiling = (total / STAY_NIGHTS).floor() as u64;
        Self {
            total,
            daily_ceiling,
        }
    }

    pub fn affords(&self, nightly_price: f64) -> bool {
        nightly_price * STAY_NIGHTS <= self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousand_income_gives_twenty_one_per_night() {
        let budget = Budget::from_income(Income::parse("1000").unwrap());
        assert!((budget.total - 650.0).abs() < 1e-9);
        assert_eq!(format!("{:.2}", budget.total), "650.00");
        assert_eq!(budget.daily_ceiling, 21);
        assert!(budget.affords(21.0));
        assert!(!budget.affords(22.0));
    }

    #[test]
    fn budget_scales_with_income() {
        for income in [0.0, 1.0, 29.99, 461.54, 1234.5, 99_999.0] {
            let budget = Budget::from_income(Income::new(income).unwrap());
            assert!((budget.total - income * 0.65).abs() < 1e-9);
            assert_eq!(budget.daily_ceiling, (income * 0.65 / 30.0).floor() as u64);
        }
    }

    #[test]
    fn zero_income_affords_only_free_stays() {
        let budget = Budget::from_income(Income::new(0.0).unwrap());
        assert_eq!(budget.daily_ceiling, 0);
        assert!(budget.affords(0.0));
        assert!(!budget.affords(0.5));
    }

    #[test]
    fn rejects_unusable_income() {
        assert_eq!(Income::parse(""), Err(BudgetError::Empty));
        assert_eq!(Income::parse("   "), Err(BudgetError::Empty));
        assert_eq!(
            Income::parse("lots"),
            Err(BudgetError::NotANumber("lots".to_string()))
        );
        assert_eq!(Income::parse("-5"), Err(BudgetError::Negative(-5.0)));
        assert_eq!(Income::parse("NaN"), Err(BudgetError::NotFinite));
        assert_eq!(Income::parse("inf"), Err(BudgetError::NotFinite));
    }

    #[test]
    fn accepts_padded_decimal_income() {
        assert_eq!(Income::parse(" 1500.50 ").unwrap().value(), 1500.5);
    }
}

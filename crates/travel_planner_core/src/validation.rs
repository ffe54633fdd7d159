//! crates/travel_planner_core/src/validation.rs
//!
//! Field-level rules that do not need storage.

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Rating must be between 1 and 5")]
    InvalidRating,
    #[error("Deduction must be a non-negative integer")]
    InvalidDeduction,
}

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// Absent, empty and whitespace-only strings all count as missing.
pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

pub fn validate_rating(rating: i32) -> Result<i32, ValidationError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(rating)
    } else {
        Err(ValidationError::InvalidRating)
    }
}

pub fn validate_deduction(deduction: Option<i32>) -> Result<Option<i32>, ValidationError> {
    match deduction {
        Some(d) if d < 0 => Err(ValidationError::InvalidDeduction),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds_are_inclusive() {
        assert_eq!(validate_rating(1), Ok(1));
        assert_eq!(validate_rating(5), Ok(5));
        assert_eq!(validate_rating(0), Err(ValidationError::InvalidRating));
        assert_eq!(validate_rating(6), Err(ValidationError::InvalidRating));
        assert_eq!(validate_rating(-3), Err(ValidationError::InvalidRating));
    }

    #[test]
    fn deduction_may_be_absent_or_zero() {
        assert_eq!(validate_deduction(None), Ok(None));
        assert_eq!(validate_deduction(Some(0)), Ok(Some(0)));
        assert_eq!(validate_deduction(Some(12)), Ok(Some(12)));
        assert_eq!(validate_deduction(Some(-1)), Err(ValidationError::InvalidDeduction));
    }

    #[test]
    fn blank_strings_count_as_missing() {
        assert!(is_blank(None));
        assert!(is_blank(Some("")));
        assert!(is_blank(Some("   ")));
        assert!(!is_blank(Some("alice")));
    }
}

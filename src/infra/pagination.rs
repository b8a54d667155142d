//! Offset based pagination.

use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use validator::Validate;

/// The number of elements returned when no limit is given.
pub const DEFAULT_LIMIT: i64 = 10;

/// Pagination parameters.
///
/// Negative values are rejected by [`Validate`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// The number of elements to skip.
    #[validate(range(min = 0))]
    skip: Option<i64>,
    /// The maximum number of elements to return.
    #[validate(range(min = 0))]
    limit: Option<i64>,
}

impl PaginationParams {
    /// Creates parameters with both bounds set.
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip: Some(skip),
            limit: Some(limit),
        }
    }

    pub fn skip(&self) -> i64 {
        self.skip.unwrap_or(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::validation::Valid;

    #[test]
    fn defaults_to_first_ten() {
        let params = PaginationParams::default();
        assert_eq!(0, params.skip());
        assert_eq!(10, params.limit());
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let params: PaginationParams = serde_json::from_str(r#"{"limit": 3}"#).unwrap();
        assert_eq!(0, params.skip());
        assert_eq!(3, params.limit());
    }

    #[test]
    fn zero_is_allowed() {
        assert!(Valid::new(PaginationParams::new(0, 0)).is_ok());
    }

    #[test]
    fn negative_values_are_rejected() {
        assert!(Valid::new(PaginationParams::new(-1, 10)).is_err());
        assert!(Valid::new(PaginationParams::new(0, -10)).is_err());
    }
}

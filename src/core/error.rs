use thiserror::Error;

/// Errors returned by the ranker and the discovery modes
///
/// Empty pools and fully filtered pools are normal outcomes (an empty
/// sequence), never errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RankError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Validate a caller-supplied limit and convert it to a result count
pub fn validate_limit(limit: i64) -> Result<usize, RankError> {
    if limit <= 0 {
        return Err(RankError::InvalidArgument(format!(
            "limit must be at least 1, got {}",
            limit
        )));
    }
    usize::try_from(limit)
        .map_err(|_| RankError::InvalidArgument(format!("limit {} is too large", limit)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_validation() {
        assert_eq!(validate_limit(5), Ok(5));
        assert!(validate_limit(0).is_err());
        assert!(validate_limit(-3).is_err());
    }
}

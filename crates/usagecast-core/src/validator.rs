//! # Fact Validator
//!
//! Fail-fast validation of usage facts.
//!
//! - Reject per-column usage (only `"*"` is modeled)
//! - Reject zero read counts
//!
//! Validation runs over the whole batch before any projector exists, so a
//! single bad fact aborts the batch before any output unit is produced.

use crate::keys::entity_key;
use crate::{UsageError, UsageFact};

/// The FactValidator checks facts before they enter a `FactSet`.
pub struct FactValidator;

impl FactValidator {
    /// Validate a single fact.
    ///
    /// Granularity is checked before the read count. Empty identifying
    /// fields are accepted; key formatting is total over them.
    pub fn validate(fact: &UsageFact) -> Result<(), UsageError> {
        if !fact.is_whole_entity() {
            return Err(UsageError::UnsupportedGranularity {
                column: fact.column.clone(),
                entity: entity_key(fact).into_string(),
            });
        }

        if fact.read_count == 0 {
            return Err(UsageError::InvalidReadCount {
                entity: entity_key(fact).into_string(),
                user: fact.user_email.clone(),
            });
        }

        Ok(())
    }

    /// Validate every fact of a batch, stopping at the first failure.
    pub fn validate_all<'a>(
        facts: impl IntoIterator<Item = &'a UsageFact>,
    ) -> Result<usize, UsageError> {
        let mut count = 0;
        for (index, fact) in facts.into_iter().enumerate() {
            if let Err(e) = Self::validate(fact) {
                tracing::warn!(index, error = %e, "rejecting usage fact batch");
                return Err(e);
            }
            count += 1;
        }
        Ok(count)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fact() -> UsageFact {
        UsageFact::new("hive", "gold", "sales", "orders", "alice@co")
    }

    #[test]
    fn accepts_whole_entity_fact() {
        assert!(FactValidator::validate(&fact()).is_ok());
    }

    #[test]
    fn rejects_column_usage() {
        let result = FactValidator::validate(&fact().with_column("customer_id"));
        assert_eq!(
            result,
            Err(UsageError::UnsupportedGranularity {
                column: "customer_id".to_string(),
                entity: "hive://gold.sales/orders".to_string(),
            })
        );
    }

    #[test]
    fn rejects_empty_column() {
        let result = FactValidator::validate(&fact().with_column(""));
        assert!(matches!(
            result,
            Err(UsageError::UnsupportedGranularity { .. })
        ));
    }

    #[test]
    fn granularity_is_checked_before_read_count() {
        let bad = fact().with_column("id").with_read_count(0);
        assert!(matches!(
            FactValidator::validate(&bad),
            Err(UsageError::UnsupportedGranularity { .. })
        ));
    }

    #[test]
    fn rejects_zero_read_count() {
        let result = FactValidator::validate(&fact().with_read_count(0));
        assert!(matches!(result, Err(UsageError::InvalidReadCount { .. })));
    }

    #[test]
    fn accepts_empty_identifying_fields() {
        let mut sparse = UsageFact::new("hive", "", "sales", "orders", "alice@co");
        assert_eq!(FactValidator::validate(&sparse), Ok(()));

        sparse.database.clear();
        sparse.table.clear();
        sparse.user_email.clear();
        assert_eq!(FactValidator::validate(&sparse), Ok(()));
    }

    #[test]
    fn validate_all_counts_facts() {
        let facts = vec![fact(), fact().with_read_count(7)];
        assert_eq!(FactValidator::validate_all(&facts), Ok(2));
    }

    #[test]
    fn validate_all_stops_at_first_bad_fact() {
        let facts = vec![fact(), fact().with_column("id"), fact().with_read_count(0)];
        assert!(matches!(
            FactValidator::validate_all(&facts),
            Err(UsageError::UnsupportedGranularity { .. })
        ));
    }
}

//! Merging one source's data into the accumulator

use std::collections::BTreeMap;
use types::{EnvSyncError, MergeStrategy, Result};

/// Merge `incoming` into `acc` and return the net growth in key count.
///
/// Under [`MergeStrategy::Error`] every duplicate is checked before anything is
/// inserted, so a conflict leaves `acc` untouched. The conflict reported is the
/// smallest duplicate key.
pub fn merge_into(
    acc: &mut BTreeMap<String, String>,
    incoming: BTreeMap<String, String>,
    strategy: MergeStrategy,
) -> Result<usize> {
    let before = acc.len();

    match strategy {
        MergeStrategy::Override => acc.extend(incoming),
        MergeStrategy::Preserve => {
            for (key, value) in incoming {
                acc.entry(key).or_insert(value);
            }
        }
        MergeStrategy::Error => {
            if let Some((key, value)) = incoming.iter().find(|(key, _)| acc.contains_key(*key)) {
                return Err(EnvSyncError::MergeConflict {
                    key: key.clone(),
                    existing: acc[key].clone(),
                    incoming: value.clone(),
                });
            }
            acc.extend(incoming);
        }
    }

    Ok(acc.len() - before)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_override_last_writer_wins() {
        let mut acc = map(&[("K", "1")]);
        let added = merge_into(&mut acc, map(&[("K", "2"), ("N", "x")]), MergeStrategy::Override).unwrap();
        assert_eq!(acc["K"], "2");
        assert_eq!(added, 1);
    }

    #[test]
    fn test_preserve_first_writer_wins() {
        let mut acc = map(&[("K", "1")]);
        let added = merge_into(&mut acc, map(&[("K", "2")]), MergeStrategy::Preserve).unwrap();
        assert_eq!(acc["K"], "1");
        assert_eq!(added, 0);
    }

    #[test]
    fn test_error_strategy_is_atomic() {
        let mut acc = map(&[("K", "1")]);
        let err = merge_into(&mut acc, map(&[("A", "new"), ("K", "2")]), MergeStrategy::Error)
            .unwrap_err();

        match err {
            EnvSyncError::MergeConflict {
                key,
                existing,
                incoming,
            } => {
                assert_eq!(key, "K");
                assert_eq!(existing, "1");
                assert_eq!(incoming, "2");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(acc, map(&[("K", "1")]));
    }

    #[test]
    fn test_overwrite_only_reports_zero_growth() {
        let mut acc = map(&[("K", "1")]);
        let added = merge_into(&mut acc, map(&[("K", "2")]), MergeStrategy::Override).unwrap();
        assert_eq!(added, 0);
        assert_eq!(acc["K"], "2");
    }
}

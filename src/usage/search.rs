use super::record::AppRecord;

/// Filter `records` by a case-insensitive substring of name or package id.
///
/// A blank query returns every record in its original order. Callers always
/// pass the full scan result, so filtering never compounds.
pub fn search(records: &[AppRecord], query: &str) -> Vec<AppRecord> {
    if query.trim().is_empty() {
        return records.to_vec();
    }

    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|r| matches_query(r, &needle))
        .cloned()
        .collect()
}

fn matches_query(record: &AppRecord, needle: &str) -> bool {
    record.display_name.to_lowercase().contains(needle)
        || record.package_id.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<AppRecord> {
        vec![
            AppRecord::new("Calculator", "com.android.calculator2", 0),
            AppRecord::new("Maps", "com.google.android.apps.maps", 10),
            AppRecord::new("Old Game", "org.example.game", 20),
        ]
    }

    #[test]
    fn test_empty_query_returns_all_in_order() {
        let records = sample();
        assert_eq!(search(&records, ""), records);
        assert_eq!(search(&records, "   "), records);
    }

    #[test]
    fn test_case_insensitive_name_match() {
        let result = search(&sample(), "calc");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].display_name, "Calculator");

        let upper = search(&sample(), "CALC");
        assert_eq!(upper, result);
    }

    #[test]
    fn test_matches_package_id() {
        let result = search(&sample(), "google");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].display_name, "Maps");
    }

    #[test]
    fn test_no_match() {
        assert!(search(&sample(), "zzz").is_empty());
    }

    #[test]
    fn test_not_cumulative() {
        let records = sample();
        let narrowed = search(&records, "game");
        assert_eq!(narrowed.len(), 1);
        // Re-applying a broader query to the original set widens again.
        assert_eq!(search(&records, "o").len(), 3);
    }
}

/// Known error substrings and the remediation hint for each, in report order.
pub const ERROR_PATTERNS: &[(&str, &str)] = &[
    (
        "Access Denied",
        "This is typically a permissions issue. Check user access rights and security groups.",
    ),
    (
        "Module not found",
        "The module may not be installed or the technical name is incorrect.",
    ),
    (
        "Database locked",
        "Another process may be using the database. Check for running upgrades or backups.",
    ),
    (
        "psycopg2",
        "This is a PostgreSQL database error. Check database connectivity and permissions.",
    ),
    (
        "ImportError",
        "A Python dependency is missing. Check that all required packages are installed.",
    ),
    (
        "ValidationError",
        "Data validation failed. Check that all required fields are filled correctly.",
    ),
    (
        "MissingError",
        "A record was not found. It may have been deleted or the ID is incorrect.",
    ),
];

/// Appended when no pattern in [`ERROR_PATTERNS`] matches.
pub const NO_PATTERN_MATCHED: &str =
    "No specific pattern matched. Please provide more context or check the server logs.";

/// Suggests causes for an Odoo error message.
///
/// Matching is a case-insensitive substring test against every entry of
/// [`ERROR_PATTERNS`]; each hit contributes one `Possible cause:` line.
pub fn analyze_error(error_message: &str) -> String {
    let mut result = format!("Error Analysis for: {}\n\n", error_message);
    let haystack = error_message.to_lowercase();

    let mut matched = false;
    for (pattern, remediation) in ERROR_PATTERNS {
        if haystack.contains(&pattern.to_lowercase()) {
            result.push_str("Possible cause: ");
            result.push_str(remediation);
            result.push('\n');
            matched = true;
        }
    }

    if !matched {
        result.push_str(NO_PATTERN_MATCHED);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_denied_yields_permissions_hint() {
        let out = analyze_error("odoo.exceptions.AccessError: Access Denied for res.users");
        assert!(out.starts_with("Error Analysis for: odoo.exceptions.AccessError"));
        assert!(out.contains(
            "Possible cause: This is typically a permissions issue. Check user access rights and security groups."
        ));
        assert!(!out.contains(NO_PATTERN_MATCHED));
    }

    #[test]
    fn unmatched_message_gets_exact_default() {
        let msg = "something odd happened";
        assert_eq!(
            analyze_error(msg),
            format!("Error Analysis for: {}\n\n{}", msg, NO_PATTERN_MATCHED)
        );
    }

    #[test]
    fn matching_ignores_case() {
        let out = analyze_error("PSYCOPG2.OperationalError: could not connect");
        assert!(out.contains("PostgreSQL database error"));
    }

    #[test]
    fn multiple_matches_keep_table_order() {
        let out = analyze_error("MissingError raised after ValidationError in psycopg2 cursor");
        let psycopg = out.find("PostgreSQL").unwrap();
        let validation = out.find("Data validation failed").unwrap();
        let missing = out.find("A record was not found").unwrap();
        assert!(psycopg < validation && validation < missing);
        assert_eq!(out.matches("Possible cause:").count(), 3);
    }

    #[test]
    fn empty_message_uses_default() {
        assert!(analyze_error("").ends_with(NO_PATTERN_MATCHED));
    }
}

// ── Name lookup and composite IDs ──

use crate::error::CoreError;

/// First item whose name equals `name` exactly (case-sensitive).
pub fn find_by_name<'a, T>(
    items: &'a [T],
    name: &str,
    name_fn: impl Fn(&T) -> &str,
) -> Option<&'a T> {
    items.iter().find(|item| name_fn(item) == name)
}

/// `"<parent>/<child>"`, for objects without a single natural key.
pub fn composite_id(parent: &str, child: &str) -> String {
    format!("{parent}/{child}")
}

/// Split a composite ID back into `(parent, child)`.
///
/// Exactly one `/` with non-empty halves is accepted.
pub fn parse_composite_id(id: &str) -> Result<(&str, &str), CoreError> {
    match id.split_once('/') {
        Some((parent, child))
            if !parent.is_empty() && !child.is_empty() && !child.contains('/') =>
        {
            Ok((parent, child))
        }
        _ => Err(CoreError::ValidationFailed {
            message: format!("invalid ID {id:?}: expected <parent>/<child>"),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct Named(&'static str, u32);

    fn items() -> Vec<Named> {
        vec![
            Named("web", 1),
            Named("db", 2),
            Named("Web", 3),
            Named("web", 4),
        ]
    }

    #[test]
    fn first_exact_match_wins() {
        let items = items();
        let found = find_by_name(&items, "web", |n| n.0).unwrap();
        assert_eq!(found.1, 1);
    }

    #[test]
    fn match_is_case_sensitive() {
        let items = items();
        assert_eq!(find_by_name(&items, "Web", |n| n.0).unwrap().1, 3);
        assert!(find_by_name(&items, "DB", |n| n.0).is_none());
        assert!(find_by_name(&items, "cache", |n| n.0).is_none());
    }

    #[test]
    fn composite_id_round_trip() {
        let id = composite_id("0717_e21b7391", "0717-a1b2");
        assert_eq!(id, "0717_e21b7391/0717-a1b2");
        assert_eq!(
            parse_composite_id(&id).unwrap(),
            ("0717_e21b7391", "0717-a1b2")
        );
    }

    #[test]
    fn malformed_composite_ids_are_rejected() {
        for bad in ["", "abc", "/b", "a/", "a/b/c"] {
            assert!(parse_composite_id(bad).is_err(), "{bad:?} should fail");
        }
    }
}

use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};

/// Text fields a free-text user search scans.
pub const USER_SEARCH_FIELDS: &[&str] = &["name", "email", "address", "phone"];

/// Text fields a free-text project search scans.
pub const PROJECT_SEARCH_FIELDS: &[&str] = &[
    "name",
    "description",
    "country",
    "cost",
    "posting_date",
    "dateline",
    "summary",
];

/// Query parameters accepted by the user listing.
#[derive(Debug, Default, Deserialize)]
pub struct UserSearch {
    pub search: Option<String>,
    pub recent: Option<bool>,
}

/// Query parameters accepted by the project listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSearch {
    pub search: Option<String>,
    pub start_date: Option<String>,
}

/// Escape LIKE metacharacters so the term always matches literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Append `AND (f1 ILIKE $n OR f2 ILIKE $n+1 OR ...)` over every listed
/// field. Each field gets its own bound pattern; the OR chain must cover the
/// whole list, a match on any single field is a match.
fn push_any_field_match(qb: &mut QueryBuilder<'_, Postgres>, fields: &[&str], term: &str) {
    let pattern = format!("%{}%", escape_like(term));
    qb.push(" AND (");
    let mut first = true;
    for field in fields {
        if !first {
            qb.push(" OR ");
        }
        first = false;
        qb.push(*field);
        qb.push(" ILIKE ");
        qb.push_bind(pattern.clone());
    }
    qb.push(")");
}

fn nonempty(term: Option<&str>) -> Option<&str> {
    term.map(str::trim).filter(|t| !t.is_empty())
}

/// AND-compose the user filters onto a query ending in a WHERE clause.
pub fn apply_user_filters(qb: &mut QueryBuilder<'_, Postgres>, params: &UserSearch) {
    if let Some(term) = nonempty(params.search.as_deref()) {
        push_any_field_match(qb, USER_SEARCH_FIELDS, term);
    }
    if params.recent == Some(true) {
        qb.push(" AND created_at >= now() - interval '7 days'");
    }
}

/// AND-compose the project filters onto a query ending in a WHERE clause.
pub fn apply_project_filters(qb: &mut QueryBuilder<'_, Postgres>, params: &ProjectSearch) {
    if let Some(term) = nonempty(params.search.as_deref()) {
        push_any_field_match(qb, PROJECT_SEARCH_FIELDS, term);
    }
    if let Some(start) = nonempty(params.start_date.as_deref()) {
        qb.push(" AND posting_date >= ");
        qb.push_bind(start.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_sql(params: &UserSearch) -> String {
        let mut qb = QueryBuilder::new("SELECT * FROM users WHERE TRUE");
        apply_user_filters(&mut qb, params);
        qb.sql().to_string()
    }

    fn project_sql(params: &ProjectSearch) -> String {
        let mut qb = QueryBuilder::new("SELECT * FROM projects WHERE TRUE");
        apply_project_filters(&mut qb, params);
        qb.sql().to_string()
    }

    #[test]
    fn no_filters_leave_query_untouched() {
        assert_eq!(user_sql(&UserSearch::default()), "SELECT * FROM users WHERE TRUE");
        assert_eq!(
            project_sql(&ProjectSearch::default()),
            "SELECT * FROM projects WHERE TRUE"
        );
    }

    #[test]
    fn blank_search_is_ignored() {
        let sql = user_sql(&UserSearch {
            search: Some("   ".into()),
            recent: None,
        });
        assert_eq!(sql, "SELECT * FROM users WHERE TRUE");
    }

    // Every searchable field must appear in the OR chain with its own bind.
    // A term matching only e.g. the address field has to match the record.
    #[test]
    fn search_ors_across_all_user_fields() {
        let sql = user_sql(&UserSearch {
            search: Some("dhaka".into()),
            recent: None,
        });
        for (i, field) in USER_SEARCH_FIELDS.iter().enumerate() {
            assert!(
                sql.contains(&format!("{} ILIKE ${}", field, i + 1)),
                "missing predicate for {field}: {sql}"
            );
        }
        assert_eq!(sql.matches(" OR ").count(), USER_SEARCH_FIELDS.len() - 1);
    }

    #[test]
    fn search_ors_across_all_project_fields() {
        let sql = project_sql(&ProjectSearch {
            search: Some("bridge".into()),
            start_date: None,
        });
        for (i, field) in PROJECT_SEARCH_FIELDS.iter().enumerate() {
            assert!(
                sql.contains(&format!("{} ILIKE ${}", field, i + 1)),
                "missing predicate for {field}: {sql}"
            );
        }
        assert_eq!(
            sql.matches(" OR ").count(),
            PROJECT_SEARCH_FIELDS.len() - 1
        );
    }

    #[test]
    fn filters_compose_with_and() {
        let sql = user_sql(&UserSearch {
            search: Some("ann".into()),
            recent: Some(true),
        });
        assert!(sql.contains("created_at >= now() - interval '7 days'"));
        assert!(sql.contains(" AND ("));

        let sql = project_sql(&ProjectSearch {
            search: None,
            start_date: Some("2024-01-01".into()),
        });
        assert!(sql.ends_with("posting_date >= $1"));
    }

    #[test]
    fn recent_false_adds_nothing() {
        let sql = user_sql(&UserSearch {
            search: None,
            recent: Some(false),
        });
        assert_eq!(sql, "SELECT * FROM users WHERE TRUE");
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("plain"), "plain");
    }
}

//! `CREATE TABLE` statement extraction.

use super::columns::parse_columns;
use super::lexer::{Lexer, Token, matching_paren, qualified_name};
use crate::ast::{TableDescriptor, TableRegistry};

/// Scan normalized DDL for `CREATE TABLE name (...)` statements and build the
/// table registry.
///
/// Text with no recognizable statement yields an empty registry. A table
/// declared twice keeps its first position and the later definition.
pub fn extract_tables(sql: &str) -> TableRegistry {
    let tokens = Lexer::new(sql).tokenize();
    let mut tables = TableRegistry::new();
    let mut pos = 0;

    while pos < tokens.len() {
        if tokens[pos].token != Token::Create
            || tokens.get(pos + 1).map(|s| &s.token) != Some(&Token::Table)
        {
            pos += 1;
            continue;
        }
        pos += 2;

        // Skip IF NOT EXISTS
        if tokens.get(pos).map(|s| &s.token) == Some(&Token::If) {
            while pos < tokens.len() && tokens[pos].token != Token::Exists {
                pos += 1;
            }
            pos += 1;
        }

        let Some((name, used)) = tokens.get(pos..).and_then(|rest| qualified_name(rest, sql))
        else {
            log::debug!("CREATE TABLE without a table name, skipping");
            continue;
        };
        pos += used;

        if tokens.get(pos).map(|s| &s.token) != Some(&Token::LParen) {
            log::debug!("table {} has no column list, skipping", name);
            continue;
        }
        let Some(close) = matching_paren(&tokens, pos) else {
            log::debug!("table {} column list is never closed, skipping", name);
            break;
        };

        let body = &sql[tokens[pos].span.end..tokens[close].span.start];
        let columns = parse_columns(body);
        log::debug!("extracted table {} with {} columns", name, columns.len());

        let key = name.to_lowercase();
        let table = TableDescriptor::new(name, columns);
        if let Some(previous) = tables.insert(key, table) {
            log::warn!("table {} is declared more than once, keeping the last definition", previous.name);
        }

        pos = close + 1;
    }

    tables
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::normalize;

    #[test]
    fn test_extract_simple_table() {
        let tables = extract_tables("CREATE TABLE users (id INT PRIMARY KEY, name VARCHAR(100))");

        assert_eq!(tables.len(), 1);
        let users = &tables["users"];
        assert_eq!(users.name, "users");
        assert_eq!(users.columns.len(), 2);
        assert_eq!(users.primary_key.as_deref(), Some("id"));
        assert!(users.foreign_keys.is_empty());
    }

    #[test]
    fn test_nested_parens_do_not_truncate_body() {
        let sql = "CREATE TABLE items (price DECIMAL(10,2) NOT NULL, label VARCHAR(20), qty INT)";
        let tables = extract_tables(sql);

        let names: Vec<&str> = tables["items"].columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["price", "label", "qty"]);
    }

    #[test]
    fn test_registry_keeps_source_order_and_case() {
        let sql = normalize(
            "CREATE TABLE Zeta (id INT);
             create table alpha (id INT);
             CREATE TABLE Mid (id INT);",
        );
        let tables = extract_tables(&sql);

        let keys: Vec<&str> = tables.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(tables["zeta"].name, "Zeta");
    }

    #[test]
    fn test_if_not_exists_and_schema_prefix() {
        let tables = extract_tables("CREATE TABLE IF NOT EXISTS public.orders (id INT)");

        assert_eq!(tables.len(), 1);
        assert_eq!(tables["orders"].name, "orders");
    }

    #[test]
    fn test_duplicate_table_replaced_in_place() {
        let sql = "CREATE TABLE a (x INT); CREATE TABLE b (y INT); CREATE TABLE A (z INT)";
        let tables = extract_tables(sql);

        let keys: Vec<&str> = tables.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(tables["a"].columns[0].name, "z");
    }

    #[test]
    fn test_no_tables() {
        assert!(extract_tables("").is_empty());
        assert!(extract_tables("SELECT 1; CREATE INDEX i ON t (x)").is_empty());
        assert!(extract_tables("CREATE TABLE broken (id INT").is_empty());
    }

    #[test]
    fn test_table_without_columns() {
        let tables = extract_tables("CREATE TABLE empty ()");

        assert!(tables["empty"].columns.is_empty());
        assert_eq!(tables["empty"].primary_key, None);
    }
}

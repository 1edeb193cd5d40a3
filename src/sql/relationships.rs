//! Foreign-key relationship extraction.

use super::lexer::{Lexer, Spanned, Token, qualified_name, word_text};
use crate::ast::{Cardinality, RelationshipDescriptor, RelationshipId, TableRegistry};
use crate::convert::ConvertError;

/// Decides the cardinality of a foreign-key relationship.
pub trait CardinalityRule: Send + Sync {
    fn classify(&self, from_table: &str, to_table: &str) -> Cardinality;
}

/// Treats every foreign key as one-to-many.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeOneToMany;

impl CardinalityRule for AssumeOneToMany {
    fn classify(&self, _from_table: &str, _to_table: &str) -> Cardinality {
        Cardinality::OneToMany
    }
}

/// A `FOREIGN KEY (col) REFERENCES table(col)` clause found in the text.
#[derive(Debug, Clone, PartialEq)]
struct ForeignKeyClause {
    column: String,
    target: String,
    target_column: String,
}

/// Scan normalized DDL for foreign keys and record them against their owning
/// tables.
///
/// `FOREIGN KEY` clauses come first, in text order; the owner is the first
/// registered table with a matching column, and clauses with no owner are
/// dropped. Inline column `REFERENCES` follow, skipping any already recorded.
pub fn extract_relationships(
    sql: &str,
    tables: &mut TableRegistry,
    rule: &dyn CardinalityRule,
) -> Result<Vec<RelationshipDescriptor>, ConvertError> {
    let tokens = Lexer::new(sql).tokenize();
    let mut relationships = Vec::new();

    for fk in foreign_key_clauses(&tokens, sql) {
        let owner = tables
            .values()
            .position(|t| t.column(&fk.column).is_some());
        let Some(owner) = owner else {
            log::debug!(
                "dropping foreign key {} -> {}({}): no table has that column",
                fk.column,
                fk.target,
                fk.target_column
            );
            continue;
        };

        let from_table = owner_key(tables, owner)?;
        let to_table = fk.target.to_lowercase();
        let relationship = RelationshipDescriptor {
            cardinality: rule.classify(&from_table, &to_table),
            from_table,
            from_column: fk.column,
            to_table,
            to_column: fk.target_column,
        };
        record(tables, owner, &mut relationships, relationship)?;
    }

    for (owner, relationship) in inline_references(tables, rule) {
        let exists = relationships.iter().any(|r| {
            r.from_table == relationship.from_table
                && r.from_column.to_lowercase() == relationship.from_column.to_lowercase()
                && r.to_table == relationship.to_table
        });
        if !exists {
            record(tables, owner, &mut relationships, relationship)?;
        }
    }

    Ok(relationships)
}

fn owner_key(tables: &TableRegistry, index: usize) -> Result<String, ConvertError> {
    tables
        .get_index(index)
        .map(|(key, _)| key.clone())
        .ok_or_else(|| ConvertError::Invariant(format!("no table at registry index {}", index)))
}

fn record(
    tables: &mut TableRegistry,
    owner: usize,
    relationships: &mut Vec<RelationshipDescriptor>,
    relationship: RelationshipDescriptor,
) -> Result<(), ConvertError> {
    let (_, table) = tables.get_index_mut(owner).ok_or_else(|| {
        ConvertError::Invariant(format!("no table at registry index {}", owner))
    })?;

    log::debug!(
        "relationship {}.{} -> {}.{} ({})",
        relationship.from_table,
        relationship.from_column,
        relationship.to_table,
        relationship.to_column,
        relationship.cardinality
    );
    table.foreign_keys.push(RelationshipId(relationships.len()));
    relationships.push(relationship);
    Ok(())
}

fn foreign_key_clauses(tokens: &[Spanned], sql: &str) -> Vec<ForeignKeyClause> {
    let mut clauses = Vec::new();
    let mut pos = 0;

    while pos < tokens.len() {
        if tokens[pos].token == Token::Foreign {
            if let Some((clause, used)) = foreign_key_at(&tokens[pos..], sql) {
                clauses.push(clause);
                pos += used;
                continue;
            }
        }
        pos += 1;
    }

    clauses
}

/// Match `FOREIGN KEY ( col ) REFERENCES table ( col )` at the start of
/// `tokens`.
fn foreign_key_at(tokens: &[Spanned], sql: &str) -> Option<(ForeignKeyClause, usize)> {
    let [foreign, key, open, column, close, references, rest @ ..] = tokens else {
        return None;
    };
    let shape_ok = foreign.token == Token::Foreign
        && key.token == Token::Key
        && open.token == Token::LParen
        && close.token == Token::RParen
        && references.token == Token::References;
    if !shape_ok {
        return None;
    }
    let column = word_text(column, sql)?;

    let (target, used) = qualified_name(rest, sql)?;
    let [open, target_column, close, ..] = &rest[used..] else {
        return None;
    };
    if open.token != Token::LParen || close.token != Token::RParen {
        return None;
    }
    let target_column = word_text(target_column, sql)?;

    Some((
        ForeignKeyClause {
            column,
            target,
            target_column,
        },
        6 + used + 3,
    ))
}

/// Relationships declared inline on columns, with the registry index of the
/// declaring table.
fn inline_references(
    tables: &TableRegistry,
    rule: &dyn CardinalityRule,
) -> Vec<(usize, RelationshipDescriptor)> {
    let mut found = Vec::new();

    for (index, (key, table)) in tables.iter().enumerate() {
        for col in &table.columns {
            let Some(reference) = &col.references else {
                continue;
            };
            let to_table = reference.table.to_lowercase();
            // A bare `REFERENCES t` points at the target's primary key
            let to_column = reference
                .column
                .clone()
                .or_else(|| tables.get(&to_table).and_then(|t| t.primary_key.clone()))
                .unwrap_or_else(|| "id".to_string());

            found.push((
                index,
                RelationshipDescriptor {
                    from_table: key.clone(),
                    from_column: col.name.clone(),
                    cardinality: rule.classify(key, &to_table),
                    to_table,
                    to_column,
                },
            ));
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::tables::extract_tables;

    fn run(sql: &str) -> (TableRegistry, Vec<RelationshipDescriptor>) {
        let mut tables = extract_tables(sql);
        let relationships = extract_relationships(sql, &mut tables, &AssumeOneToMany).unwrap();
        (tables, relationships)
    }

    #[test]
    fn test_foreign_key_resolves_owner() {
        let (tables, rels) = run(
            "CREATE TABLE orders (id INT PRIMARY KEY, user_id INT, \
             FOREIGN KEY (user_id) REFERENCES users(id)); \
             CREATE TABLE users (id INT PRIMARY KEY);",
        );

        assert_eq!(
            rels,
            vec![RelationshipDescriptor {
                from_table: "orders".to_string(),
                from_column: "user_id".to_string(),
                to_table: "users".to_string(),
                to_column: "id".to_string(),
                cardinality: Cardinality::OneToMany,
            }]
        );
        assert_eq!(tables["orders"].foreign_keys, vec![RelationshipId(0)]);
        assert!(tables["users"].foreign_keys.is_empty());
    }

    #[test]
    fn test_dangling_foreign_key_is_dropped() {
        let (tables, rels) = run(
            "CREATE TABLE orders (id INT, FOREIGN KEY (ghost_id) REFERENCES ghosts(id))",
        );

        assert!(rels.is_empty());
        assert!(tables["orders"].foreign_keys.is_empty());
    }

    #[test]
    fn test_first_table_with_column_wins() {
        let (tables, rels) = run(
            "CREATE TABLE a (user_id INT); \
             CREATE TABLE b (user_id INT, FOREIGN KEY (user_id) REFERENCES Users(id));",
        );

        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].from_table, "a");
        assert_eq!(rels[0].to_table, "users");
        assert_eq!(tables["a"].foreign_keys.len(), 1);
        assert!(tables["b"].foreign_keys.is_empty());
    }

    #[test]
    fn test_alter_table_foreign_key() {
        let (_, rels) = run(
            "CREATE TABLE posts (id INT, author_id INT); \
             ALTER TABLE posts ADD CONSTRAINT fk_author FOREIGN KEY (author_id) REFERENCES authors (id);",
        );

        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].from_table, "posts");
        assert_eq!(rels[0].to_table, "authors");
    }

    #[test]
    fn test_multi_column_foreign_key_is_ignored() {
        let (_, rels) = run(
            "CREATE TABLE line (a INT, b INT, FOREIGN KEY (a, b) REFERENCES pair(x, y))",
        );
        assert!(rels.is_empty());
    }

    #[test]
    fn test_inline_references_after_clauses() {
        let (tables, rels) = run(
            "CREATE TABLE users (uid INT PRIMARY KEY); \
             CREATE TABLE posts (id INT, author INT REFERENCES users, \
             editor INT, FOREIGN KEY (editor) REFERENCES users(uid));",
        );

        assert_eq!(rels.len(), 2);
        assert_eq!(rels[0].from_column, "editor");
        assert_eq!(rels[1].from_column, "author");
        assert_eq!(rels[1].to_column, "uid");
        assert_eq!(
            tables["posts"].foreign_keys,
            vec![RelationshipId(0), RelationshipId(1)]
        );
    }

    #[test]
    fn test_inline_reference_not_duplicated() {
        let (_, rels) = run(
            "CREATE TABLE posts (author INT REFERENCES users(id), \
             FOREIGN KEY (author) REFERENCES users(id));",
        );
        assert_eq!(rels.len(), 1);
    }

    struct Fixed(Cardinality);

    impl CardinalityRule for Fixed {
        fn classify(&self, _: &str, _: &str) -> Cardinality {
            self.0
        }
    }

    #[test]
    fn test_cardinality_rule_is_consulted() {
        let sql = "CREATE TABLE p (q_id INT, FOREIGN KEY (q_id) REFERENCES q(id))";
        let mut tables = extract_tables(sql);
        let rels =
            extract_relationships(sql, &mut tables, &Fixed(Cardinality::OneToOne)).unwrap();

        assert_eq!(rels[0].cardinality, Cardinality::OneToOne);
    }
}

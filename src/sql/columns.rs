//! Column list parsing for a single table body.

use super::lexer::{Lexer, Spanned, Token, qualified_name, word_text};
use super::types::map_type;
use crate::ast::{ColumnDescriptor, ColumnRef};

/// Parse the text between a table's parentheses into column descriptors, in
/// source order.
///
/// Clauses that are table-level constraints are skipped, except that a
/// `PRIMARY KEY (..)` constraint flags the first listed column. Clauses that do
/// not look like `<name> <type>` are dropped.
pub fn parse_columns(body: &str) -> Vec<ColumnDescriptor> {
    let tokens = Lexer::new(body).tokenize();
    let mut columns = Vec::new();
    let mut table_pk: Option<String> = None;

    for clause in split_clauses(&tokens) {
        if is_table_constraint(clause) {
            if table_pk.is_none() {
                table_pk = primary_key_list(clause, body).and_then(|names| names.into_iter().next());
            }
            continue;
        }

        match parse_column(clause, body) {
            Some(col) => columns.push(col),
            None => log::debug!("skipping column clause: {}", clause_text(clause, body)),
        }
    }

    // A composite key is represented by its leading column
    if let Some(pk) = table_pk {
        let pk = pk.to_lowercase();
        if let Some(col) = columns.iter_mut().find(|c| c.name.to_lowercase() == pk) {
            col.is_primary_key = true;
        }
    }

    columns
}

/// Split at commas outside any parentheses. Empty clauses are dropped.
fn split_clauses(tokens: &[Spanned]) -> Vec<&[Spanned]> {
    let mut clauses = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, spanned) in tokens.iter().enumerate() {
        match spanned.token {
            Token::LParen => depth += 1,
            Token::RParen => depth = depth.saturating_sub(1),
            Token::Comma if depth == 0 => {
                clauses.push(&tokens[start..i]);
                start = i + 1;
            }
            Token::Eof => {
                clauses.push(&tokens[start..i]);
                start = i;
            }
            _ => {}
        }
    }

    clauses.retain(|c| !c.is_empty());
    clauses
}

fn clause_text<'a>(clause: &[Spanned], body: &'a str) -> &'a str {
    match (clause.first(), clause.last()) {
        (Some(first), Some(last)) => body.get(first.span.start..last.span.end).unwrap_or(""),
        _ => "",
    }
}

fn is_table_constraint(clause: &[Spanned]) -> bool {
    let kind = |i: usize| clause.get(i).map(|s| &s.token);

    match (kind(0), kind(1)) {
        (Some(Token::Primary), Some(Token::Key)) | (Some(Token::Foreign), Some(Token::Key)) => {
            true
        }
        (Some(Token::Constraint), _) => true,
        (Some(Token::Unique), Some(Token::Key | Token::Index | Token::LParen)) => true,
        (Some(Token::Check), Some(Token::LParen)) => true,
        (Some(Token::Key | Token::Index), Some(Token::LParen)) => true,
        // `KEY idx_name (col)`: an index name then a column list, unlike a
        // column named `key` whose type precision is numeric
        (Some(Token::Key | Token::Index), Some(t)) if t.is_word() => {
            matches!(kind(2), Some(Token::LParen)) && kind(3).is_some_and(Token::is_word)
        }
        _ => false,
    }
}

fn primary_key_list(clause: &[Spanned], body: &str) -> Option<Vec<String>> {
    let at = clause
        .windows(2)
        .position(|w| w[0].token == Token::Primary && w[1].token == Token::Key)?;
    let rest = &clause[at + 2..];
    if rest.first()?.token != Token::LParen {
        return None;
    }

    Some(
        rest[1..]
            .iter()
            .take_while(|s| s.token != Token::RParen)
            .filter_map(|s| word_text(s, body))
            .collect(),
    )
}

fn parse_column(clause: &[Spanned], body: &str) -> Option<ColumnDescriptor> {
    let name = word_text(clause.first()?, body)?;
    let type_token = clause.get(1).filter(|s| s.token.is_word())?;

    let type_end = precision_end(&clause[2..]).unwrap_or(type_token.span.end);
    let sql_type = body.get(type_token.span.start..type_end)?.to_string();

    let is_primary_key = has_pair(clause, &Token::Primary, &Token::Key);
    let is_required = has_pair(clause, &Token::Not, &Token::Null);

    Some(ColumnDescriptor {
        name,
        document_type: map_type(&sql_type),
        sql_type,
        is_primary_key,
        is_required,
        references: inline_reference(clause, body),
    })
}

/// End offset of a `(n)` or `(n, m)` precision suffix.
fn precision_end(tokens: &[Spanned]) -> Option<usize> {
    let kinds: Vec<&Token> = tokens.iter().take(5).map(|s| &s.token).collect();

    match kinds.as_slice() {
        [Token::LParen, Token::Num(_), Token::RParen, ..] => Some(tokens[2].span.end),
        [Token::LParen, Token::Num(_), Token::Comma, Token::Num(_), Token::RParen, ..] => {
            Some(tokens[4].span.end)
        }
        _ => None,
    }
}

fn has_pair(clause: &[Spanned], first: &Token, second: &Token) -> bool {
    clause
        .windows(2)
        .any(|w| &w[0].token == first && &w[1].token == second)
}

fn inline_reference(clause: &[Spanned], body: &str) -> Option<ColumnRef> {
    let at = clause.iter().position(|s| s.token == Token::References)?;
    let rest = &clause[at + 1..];
    let (table, used) = qualified_name(rest, body)?;

    let column = match &rest[used..] {
        [open, col, close, ..] if open.token == Token::LParen && close.token == Token::RParen => {
            word_text(col, body)
        }
        _ => None,
    };

    Some(ColumnRef { table, column })
}

//! SQL to document type mapping.

use crate::ast::DocumentType;

/// Substring rules checked in order; the first hit wins.
const RULES: &[(&[&str], DocumentType)] = &[
    (&["INT"], DocumentType::Number),
    (&["VARCHAR", "TEXT", "CHAR"], DocumentType::String),
    (&["DECIMAL", "FLOAT", "DOUBLE"], DocumentType::Number),
    (&["DATE", "TIME"], DocumentType::Date),
    (&["BOOLEAN", "BOOL"], DocumentType::Boolean),
];

/// Map a raw SQL type token (precision included) to a document type.
pub fn map_type(sql_type: &str) -> DocumentType {
    let upper = sql_type.to_uppercase();

    RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| upper.contains(*n)))
        .map_or(DocumentType::Mixed, |&(_, typ)| typ)
}

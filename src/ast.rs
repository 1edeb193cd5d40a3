use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Tables of one conversion, keyed by lower-cased name in source order.
pub type TableRegistry = IndexMap<String, TableDescriptor>;

/// Value-type tag of a document field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DocumentType {
    Number,
    String,
    Date,
    Boolean,
    Mixed,
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Number => "Number",
            Self::String => "String",
            Self::Date => "Date",
            Self::Boolean => "Boolean",
            Self::Mixed => "Mixed",
        };
        f.write_str(name)
    }
}

/// Target of an inline `REFERENCES table(column)` column constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRef {
    pub table: String,
    pub column: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Raw type token, precision included (`VARCHAR(255)`).
    pub sql_type: String,
    pub document_type: DocumentType,
    pub is_primary_key: bool,
    /// Set by a `NOT NULL` marker.
    pub is_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<ColumnRef>,
}

/// Index of a relationship in the conversion's relationship list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RelationshipId(pub usize);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDescriptor {
    /// Name as spelled in the source.
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
    pub primary_key: Option<String>,
    pub foreign_keys: Vec<RelationshipId>,
}

impl TableDescriptor {
    pub fn new(name: String, columns: Vec<ColumnDescriptor>) -> Self {
        let primary_key = columns
            .iter()
            .find(|c| c.is_primary_key)
            .map(|c| c.name.clone());

        Self {
            name,
            columns,
            primary_key,
            foreign_keys: Vec::new(),
        }
    }

    /// Case-insensitive column lookup.
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        let wanted = name.to_lowercase();
        self.columns.iter().find(|c| c.name.to_lowercase() == wanted)
    }
}

/// Relationship shape between two tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Cardinality {
    #[serde(rename = "1:1")]
    OneToOne,
    #[serde(rename = "1:N")]
    OneToMany,
    #[serde(rename = "N:M")]
    ManyToMany,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let notation = match self {
            Self::OneToOne => "1:1",
            Self::OneToMany => "1:N",
            Self::ManyToMany => "N:M",
        };
        f.write_str(notation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipDescriptor {
    /// Registry key of the owning table.
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
    pub cardinality: Cardinality,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, pk: bool) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.to_string(),
            sql_type: "INT".to_string(),
            document_type: DocumentType::Number,
            is_primary_key: pk,
            is_required: false,
            references: None,
        }
    }

    #[test]
    fn test_primary_key_is_first_flagged_column() {
        let table = TableDescriptor::new(
            "Orders".to_string(),
            vec![column("note", false), column("id", true), column("alt", true)],
        );

        assert_eq!(table.primary_key.as_deref(), Some("id"));
        assert!(table.foreign_keys.is_empty());
    }

    #[test]
    fn test_no_primary_key() {
        let table = TableDescriptor::new("t".to_string(), vec![column("a", false)]);
        assert_eq!(table.primary_key, None);
    }

    #[test]
    fn test_column_lookup_ignores_case() {
        let table = TableDescriptor::new("t".to_string(), vec![column("User_Id", false)]);
        assert!(table.column("user_id").is_some());
        assert!(table.column("USER_ID").is_some());
        assert!(table.column("id").is_none());
    }

    #[test]
    fn test_cardinality_notation() {
        assert_eq!(Cardinality::OneToMany.to_string(), "1:N");
        assert_eq!(
            serde_json::to_string(&Cardinality::ManyToMany).unwrap(),
            "\"N:M\""
        );
    }
}

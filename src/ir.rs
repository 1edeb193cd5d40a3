//! Document-store schema derived from the extracted relational tables.

use crate::ast::{Cardinality, DocumentType, RelationshipDescriptor, TableDescriptor, TableRegistry};
use crate::convert::ConvertError;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// How a relationship is modeled in the target document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Nest the related document inside the parent
    Embedding,
    /// Store an identifier of a separately stored document
    Reference,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedding => f.write_str("embedding"),
            Self::Reference => f.write_str("reference"),
        }
    }
}

/// Chooses between embedding and referencing for a relationship.
pub trait StrategyPolicy: Send + Sync {
    fn choose(&self, relationship: &RelationshipDescriptor) -> Strategy;
}

/// Embeds every relationship.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysEmbed;

impl StrategyPolicy for AlwaysEmbed {
    fn choose(&self, _relationship: &RelationshipDescriptor) -> Strategy {
        Strategy::Embedding
    }
}

/// Applies one strategy to every relationship.
#[derive(Debug, Clone, Copy)]
pub struct FixedStrategy(pub Strategy);

impl StrategyPolicy for FixedStrategy {
    fn choose(&self, _relationship: &RelationshipDescriptor) -> Strategy {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    pub required: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub primary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipProjection {
    pub cardinality: Cardinality,
    pub target: String,
    pub strategy: Strategy,
    /// Source column holding the foreign key
    pub field: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionDescriptor {
    pub collection_name: String,
    pub fields: IndexMap<String, FieldSpec>,
    pub relationships: Vec<RelationshipProjection>,
}

/// Collections keyed like the table registry.
pub type Collections = IndexMap<String, CollectionDescriptor>;

/// Build one collection per table.
pub fn synthesize(
    tables: &TableRegistry,
    relationships: &[RelationshipDescriptor],
    policy: &dyn StrategyPolicy,
) -> Result<Collections, ConvertError> {
    tables
        .iter()
        .map(|(key, table)| {
            let collection = collection_for(key, table, relationships, policy)?;
            Ok((key.clone(), collection))
        })
        .collect()
}

fn collection_for(
    key: &str,
    table: &TableDescriptor,
    relationships: &[RelationshipDescriptor],
    policy: &dyn StrategyPolicy,
) -> Result<CollectionDescriptor, ConvertError> {
    let fields = table
        .columns
        .iter()
        .map(|c| {
            (
                c.name.clone(),
                FieldSpec {
                    document_type: c.document_type,
                    required: c.is_required,
                    primary: table.primary_key.as_deref() == Some(c.name.as_str()),
                },
            )
        })
        .collect();

    let mut projections = Vec::new();
    for id in &table.foreign_keys {
        let rel = relationships.get(id.0).ok_or_else(|| {
            ConvertError::Invariant(format!("table {} refers to missing relationship {}", key, id.0))
        })?;

        // Only one-to-many relationships have a modeling rule so far
        if rel.cardinality != Cardinality::OneToMany {
            continue;
        }

        let strategy = policy.choose(rel);
        projections.push(RelationshipProjection {
            cardinality: rel.cardinality,
            target: rel.to_table.clone(),
            strategy,
            field: rel.from_column.clone(),
            description: format!(
                "{} relationship with {} (strategy: {})",
                rel.cardinality, rel.to_table, strategy
            ),
        });
    }

    Ok(CollectionDescriptor {
        collection_name: key.to_string(),
        fields,
        relationships: projections,
    })
}

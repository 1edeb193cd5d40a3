//! Response envelope handed to callers (CLI, WASM).
//!
//! A report is either a successful conversion, reshaped for display, or a
//! failure message. Both carry a `success` flag.

use crate::ast::Cardinality;
use crate::convert::{ConvertError, Converter};
use crate::ir::{Collections, FieldSpec, RelationshipProjection};
use indexmap::IndexMap;
use serde::Serialize;

/// Display form of one extracted relationship.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipSummary {
    pub description: String,
    pub strategy: String,
    pub rule: String,
}

/// A collection without its name, as shown in the report schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionView {
    pub fields: IndexMap<String, FieldSpec>,
    pub relationships: Vec<RelationshipProjection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportBody {
    Converted {
        relationships: Vec<RelationshipSummary>,
        document_schema: IndexMap<String, CollectionView>,
        formatted_output: String,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub success: bool,
    #[serde(flatten)]
    pub body: ReportBody,
}

impl Report {
    /// Convert `source` and wrap the outcome. Blank input is rejected here,
    /// before the pipeline runs.
    pub fn from_source(converter: &Converter, source: &str) -> Self {
        match Self::build(converter, source) {
            Ok(report) => report,
            Err(e) => {
                log::warn!("conversion failed: {}", e);
                Self::failure(&e)
            }
        }
    }

    pub fn failure(error: &ConvertError) -> Self {
        Self {
            success: false,
            body: ReportBody::Failed {
                error: error.to_string(),
            },
        }
    }

    fn build(converter: &Converter, source: &str) -> Result<Self, ConvertError> {
        if source.trim().is_empty() {
            return Err(ConvertError::EmptyInput);
        }

        let conversion = converter.convert(source)?;

        let relationships = conversion
            .relationships
            .iter()
            .map(|rel| RelationshipSummary {
                description: format!(
                    "Relationship between {} and {}: {}",
                    rel.from_table, rel.to_table, rel.cardinality
                ),
                strategy: format!(
                    "Strategy used: {}",
                    capitalize(&converter.strategy_for(rel).to_string())
                ),
                rule: rule_name(rel.cardinality).to_string(),
            })
            .collect();

        let document_schema = view(&conversion.collections);
        let formatted_output = serde_json::to_string_pretty(&document_schema)?;

        Ok(Self {
            success: true,
            body: ReportBody::Converted {
                relationships,
                document_schema,
                formatted_output,
            },
        })
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, ConvertError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

fn view(collections: &Collections) -> IndexMap<String, CollectionView> {
    collections
        .iter()
        .map(|(name, c)| {
            (
                name.clone(),
                CollectionView {
                    fields: c.fields.clone(),
                    relationships: c.relationships.clone(),
                },
            )
        })
        .collect()
}

fn rule_name(cardinality: Cardinality) -> &'static str {
    match cardinality {
        Cardinality::OneToOne => "Rule 1: one-to-one transformation",
        Cardinality::OneToMany => "Rule 2: one-to-many transformation",
        Cardinality::ManyToMany => "Rule 3: many-to-many transformation",
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

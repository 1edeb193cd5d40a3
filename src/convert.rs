//! Conversion pipeline: normalize, extract tables and relationships, then
//! synthesize collections.

use crate::ast::{RelationshipDescriptor, TableRegistry};
use crate::ir::{AlwaysEmbed, Collections, Strategy, StrategyPolicy, synthesize};
use crate::sql::{AssumeOneToMany, CardinalityRule, extract_relationships, extract_tables, normalize};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("No SQL content provided")]
    EmptyInput,
    #[error("Internal conversion error: {0}")]
    Invariant(String),
    #[error("Failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Everything extracted from one DDL text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    pub tables: TableRegistry,
    pub relationships: Vec<RelationshipDescriptor>,
    pub collections: Collections,
}

impl Conversion {
    /// True when the text held no recognizable table.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Runs the conversion pipeline with pluggable relationship rules.
///
/// A converter holds no per-run state, so one instance can serve concurrent
/// conversions.
pub struct Converter {
    cardinality: Box<dyn CardinalityRule>,
    strategy: Box<dyn StrategyPolicy>,
}

impl Default for Converter {
    fn default() -> Self {
        Self {
            cardinality: Box::new(AssumeOneToMany),
            strategy: Box::new(AlwaysEmbed),
        }
    }
}

impl Converter {
    pub fn with_cardinality_rule(mut self, rule: impl CardinalityRule + 'static) -> Self {
        self.cardinality = Box::new(rule);
        self
    }

    pub fn with_strategy_policy(mut self, policy: impl StrategyPolicy + 'static) -> Self {
        self.strategy = Box::new(policy);
        self
    }

    /// Strategy the configured policy picks for `relationship`.
    pub fn strategy_for(&self, relationship: &RelationshipDescriptor) -> Strategy {
        self.strategy.choose(relationship)
    }

    /// Convert DDL text. Unrecognized fragments are skipped, so any text
    /// yields a result unless an internal invariant breaks.
    pub fn convert(&self, source: &str) -> Result<Conversion, ConvertError> {
        let sql = normalize(source);

        let mut tables = extract_tables(&sql);
        let relationships = extract_relationships(&sql, &mut tables, self.cardinality.as_ref())?;
        let collections = synthesize(&tables, &relationships, self.strategy.as_ref())?;

        log::debug!(
            "converted {} tables, {} relationships",
            tables.len(),
            relationships.len()
        );

        Ok(Conversion {
            tables,
            relationships,
            collections,
        })
    }
}

/// Convert DDL text with the default rules.
pub fn convert(source: &str) -> Result<Conversion, ConvertError> {
    Converter::default().convert(source)
}

//! Plain-text outline of a conversion.

use crate::convert::Conversion;
use crate::ir::CollectionDescriptor;
use unicode_width::UnicodeWidthStr;

/// Serialize the collections of a conversion as an indented outline.
///
/// Required fields carry a trailing `*`, primary keys a `pk` tag.
pub fn outline(conversion: &Conversion) -> String {
    if conversion.is_empty() {
        return "(no tables found)\n".to_string();
    }

    let mut output = String::new();
    for (i, collection) in conversion.collections.values().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        serialize_collection(&mut output, collection);
    }
    output
}

fn serialize_collection(output: &mut String, collection: &CollectionDescriptor) {
    output.push_str("collection ");
    output.push_str(&collection.collection_name);
    output.push('\n');

    let labels: Vec<String> = collection
        .fields
        .iter()
        .map(|(name, spec)| {
            if spec.required {
                format!("{}*", name)
            } else {
                name.clone()
            }
        })
        .collect();
    let width = labels.iter().map(|l| l.width()).max().unwrap_or(0);

    for (label, spec) in labels.iter().zip(collection.fields.values()) {
        output.push_str("    ");
        output.push_str(label);
        output.push_str(&" ".repeat(width - label.width() + 2));
        output.push_str(&spec.document_type.to_string());
        if spec.primary {
            output.push_str(" pk");
        }
        output.push('\n');
    }

    for rel in &collection.relationships {
        output.push_str(&format!(
            "    -> {} ({}, {} via {})\n",
            rel.target, rel.cardinality, rel.strategy, rel.field
        ));
    }
}

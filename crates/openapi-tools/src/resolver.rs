//! Schema `$ref` resolution and body flattening.
//!
//! A body schema is resolved to a flat list of named, typed fields: one level of properties,
//! plus the item properties of an array property that the inline schema describes. References
//! are local only; the lookup key is always the last path segment of the pointer.

use crate::model::SchemaRef;
use std::collections::BTreeMap;
use tracing::debug;

/// One resolved body field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    /// `string`, `int`, `integer`, `float`, `bool`, `boolean`, `array`, `object`, or whatever
    /// the document declared.
    pub type_tag: String,
    /// Flattened in from the items of an array property.
    pub from_items: bool,
}

/// The schema name a reference points at: the segment after the last `/`.
///
/// `#/definitions/Pet` and `#/components/schemas/Pet` both yield `Pet`; a string without `/`
/// is returned unchanged.
#[must_use]
pub fn schema_name_from_ref(reference: &str) -> &str {
    match reference.rfind('/') {
        Some(i) => &reference[i + 1..],
        None => reference,
    }
}

/// Key into the schema table: the reference's schema name if there is a reference, otherwise the
/// inline type string itself.
#[must_use]
pub fn schema_lookup_key<'a>(
    reference: Option<&'a str>,
    inline_type: Option<&'a str>,
) -> Option<&'a str> {
    match reference.filter(|r| !r.is_empty()) {
        Some(r) => Some(schema_name_from_ref(r)),
        None => inline_type.filter(|t| !t.is_empty()),
    }
}

/// Flatten the body schema `schema` (with declared inline type `inline_type`) against `table`.
///
/// Unknown schema names yield no fields. Fields are ordered by property name; a name seen twice
/// keeps its first position and takes the later type.
#[must_use]
pub fn resolve_fields(
    schema: Option<&SchemaRef>,
    inline_type: Option<&str>,
    table: &BTreeMap<String, SchemaRef>,
) -> Vec<FieldSpec> {
    let reference = schema.and_then(|s| s.reference.as_deref());
    let Some(key) = schema_lookup_key(reference, inline_type) else {
        return Vec::new();
    };
    let Some(resolved) = table.get(key) else {
        debug!(schema = %key, "schema not found in document, no body fields");
        return Vec::new();
    };

    let mut fields = Vec::new();
    for (name, property) in &resolved.properties {
        let type_tag = property.type_tag();
        if type_tag == "array" {
            let items = schema
                .and_then(|s| s.properties.get(key))
                .and_then(|p| p.items.as_deref());
            if let Some(items) = items {
                merge_fields(&mut fields, item_fields(items, table));
            }
        }
        merge_fields(
            &mut fields,
            [FieldSpec {
                name: name.clone(),
                type_tag,
                from_items: false,
            }],
        );
    }
    fields
}

fn item_fields(items: &SchemaRef, table: &BTreeMap<String, SchemaRef>) -> Vec<FieldSpec> {
    let properties = if items.properties.is_empty() {
        items
            .reference
            .as_deref()
            .and_then(|r| table.get(schema_name_from_ref(r)))
            .map(|s| &s.properties)
    } else {
        Some(&items.properties)
    };

    properties
        .into_iter()
        .flatten()
        .map(|(name, property)| FieldSpec {
            name: name.clone(),
            type_tag: property.type_tag(),
            from_items: true,
        })
        .collect()
}

/// Union `incoming` into `fields`, keeping first positions and later types.
pub fn merge_fields(fields: &mut Vec<FieldSpec>, incoming: impl IntoIterator<Item = FieldSpec>) {
    for field in incoming {
        match fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => fields.push(field),
        }
    }
}

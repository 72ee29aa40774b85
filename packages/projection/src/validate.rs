//! Schema checks for shaped elements.

use osm_clean_projection_models::{
    FieldKind, FieldValue, Schema, ShapedElement, ValidationFailure,
};

/// Checks every row of `element` against `schema`.
///
/// A row fails when it carries a column the schema does not know, when a
/// cell has the wrong type, when a text cell is empty and the rule forbids
/// it, or when a float is not finite. A required column missing from the
/// row is also a failure. An empty result means the element is valid.
#[must_use]
pub fn validate_element(element: &ShapedElement, schema: &Schema) -> Vec<ValidationFailure> {
    let kind = match element {
        ShapedElement::Node { .. } => "node",
        ShapedElement::Way { .. } => "way",
    };
    let mut failures = Vec::new();

    for (table, fields) in element.rows() {
        let fail = |field: &str, message: String| ValidationFailure {
            element: kind.to_string(),
            id: element.id(),
            table,
            field: field.to_string(),
            message,
        };

        let Some(rules) = schema.table(table) else {
            failures.push(fail("*", format!("no schema for table {table}")));
            continue;
        };

        for (name, value) in &fields {
            let Some(rule) = rules.get(*name) else {
                failures.push(fail(name, "unknown field".to_string()));
                continue;
            };
            if let Some(message) = check_value(rule.kind, rule.allow_empty, value) {
                failures.push(fail(name, message));
            }
        }

        for (name, rule) in rules {
            if rule.required && !fields.iter().any(|(field, _)| *field == name.as_str()) {
                failures.push(fail(name, "required field".to_string()));
            }
        }
    }

    failures
}

fn check_value(kind: FieldKind, allow_empty: bool, value: &FieldValue<'_>) -> Option<String> {
    match (kind, value) {
        (FieldKind::Integer, FieldValue::Integer(_)) => None,
        (FieldKind::Float, FieldValue::Float(v)) if !v.is_finite() => {
            Some(format!("must be a finite number, got {v}"))
        }
        (FieldKind::Float, FieldValue::Float(_) | FieldValue::Integer(_)) => None,
        (FieldKind::String, FieldValue::Text(text)) if text.is_empty() && !allow_empty => {
            Some("empty values not allowed".to_string())
        }
        (FieldKind::String, FieldValue::Text(_)) => None,
        (expected, _) => Some(format!("must be of {expected} type")),
    }
}

#[cfg(test)]
mod tests {
    use osm_clean_projection_models::{FieldRule, NodeRow, Table, TagRow};

    use super::*;

    fn node(tags: Vec<TagRow>) -> ShapedElement {
        ShapedElement::Node {
            node: NodeRow {
                id: 1,
                lat: 51.5,
                lon: -0.1,
                user: "alice".to_string(),
                uid: 7,
                version: "1".to_string(),
                changeset: 2,
                timestamp: "2015-01-01T00:00:00Z".to_string(),
            },
            tags,
        }
    }

    fn tag(key: &str, value: &str) -> TagRow {
        TagRow {
            id: 1,
            key: key.to_string(),
            value: value.to_string(),
            kind: "regular".to_string(),
        }
    }

    #[test]
    fn well_formed_element_passes() {
        let element = node(vec![tag("amenity", "pub")]);
        assert!(validate_element(&element, &Schema::default()).is_empty());
    }

    #[test]
    fn empty_tag_key_fails() {
        let element = node(vec![tag("", "pub")]);
        let failures = validate_element(&element, &Schema::default());
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].table, Table::NodeTags);
        assert_eq!(failures[0].field, "key");
        assert_eq!(failures[0].element, "node");
        assert_eq!(failures[0].id, 1);
    }

    #[test]
    fn allow_empty_is_honoured() {
        let mut schema = Schema::default();
        schema
            .tables
            .get_mut(&Table::NodeTags)
            .unwrap()
            .get_mut("value")
            .unwrap()
            .allow_empty = true;
        let element = node(vec![tag("note", "")]);
        assert!(validate_element(&element, &schema).is_empty());
    }

    #[test]
    fn type_mismatch_fails() {
        let mut schema = Schema::default();
        schema
            .tables
            .get_mut(&Table::Nodes)
            .unwrap()
            .insert("version".to_string(), FieldRule::required(FieldKind::Integer));
        let failures = validate_element(&node(Vec::new()), &schema);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].message, "must be of integer type");
    }

    #[test]
    fn missing_and_unknown_fields() {
        let mut schema = Schema::default();
        let nodes = schema.tables.get_mut(&Table::Nodes).unwrap();
        nodes.remove("user");
        nodes.insert("visible".to_string(), FieldRule::required(FieldKind::String));

        let failures = validate_element(&node(Vec::new()), &schema);
        let mut messages: Vec<(String, String)> = failures
            .into_iter()
            .map(|f| (f.field, f.message))
            .collect();
        messages.sort();
        assert_eq!(
            messages,
            vec![
                ("user".to_string(), "unknown field".to_string()),
                ("visible".to_string(), "required field".to_string()),
            ]
        );
    }
}

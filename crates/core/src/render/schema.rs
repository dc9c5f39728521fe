//! JSON Schema (draft 4) for type graphs.
//!
//! References become `$ref` pointers to the ancestor schema, so recursive
//! types produce finite schemas.

use serde_json::{Map, Value, json};

use restdoc_model::{ContainerKind, ELEMENT_LABEL, TypeNode};

const DRAFT_4: &str = "http://json-schema.org/draft-04/schema#";

/// Schema document for the graph rooted at `root`.
pub fn json_schema(root: &TypeNode) -> Value {
    let mut schema = node_schema(root, root);
    if let Value::Object(map) = &mut schema {
        map.insert("$schema".to_string(), Value::String(DRAFT_4.to_string()));
    }
    schema
}

fn node_schema(node: &TypeNode, root: &TypeNode) -> Value {
    match node {
        TypeNode::Primitive { name } => primitive_schema(name),
        TypeNode::Object { name, fields } => {
            let properties: Map<String, Value> = fields
                .iter()
                .map(|field| (field.name.clone(), node_schema(&field.ty, root)))
                .collect();
            json!({ "type": "object", "title": name, "properties": properties })
        }
        TypeNode::Container { container, element } => {
            let element = node_schema(element, root);
            match container {
                ContainerKind::Map => json!({ "type": "object", "additionalProperties": element }),
                ContainerKind::Set => {
                    json!({ "type": "array", "items": element, "uniqueItems": true })
                }
                ContainerKind::Array | ContainerKind::List => {
                    json!({ "type": "array", "items": element })
                }
            }
        }
        TypeNode::Enumeration { name, literals } => {
            json!({ "type": "string", "title": name, "enum": literals })
        }
        TypeNode::Reference { path, .. } => json!({ "$ref": pointer(root, path) }),
    }
}

/// JSON pointer, relative to the schema root, of the node at `path`.
fn pointer(root: &TypeNode, path: &[String]) -> String {
    let mut pointer = String::from("#");
    let mut current = root;
    for label in path {
        match current {
            TypeNode::Object { fields, .. } => {
                pointer.push_str("/properties/");
                pointer.push_str(&label.replace('~', "~0").replace('/', "~1"));
                if let Some(field) = fields.iter().find(|f| &f.name == label) {
                    current = &field.ty;
                }
            }
            TypeNode::Container { container, element } if label == ELEMENT_LABEL => {
                pointer.push_str(if container.is_map() {
                    "/additionalProperties"
                } else {
                    "/items"
                });
                current = element;
            }
            _ => break,
        }
    }
    pointer
}

/// Schema for an atomic value, by its type name.
pub(crate) fn primitive_schema(name: &str) -> Value {
    match name.to_ascii_lowercase().as_str() {
        "string" | "char" | "character" => json!({ "type": "string" }),
        "int" | "integer" | "long" | "short" | "byte" | "biginteger" => {
            json!({ "type": "integer" })
        }
        "float" | "double" | "number" | "decimal" | "bigdecimal" => json!({ "type": "number" }),
        "boolean" | "bool" => json!({ "type": "boolean" }),
        "uuid" => json!({ "type": "string", "format": "uuid" }),
        "date" => json!({ "type": "string", "format": "date" }),
        "datetime" | "date-time" | "timestamp" | "instant" => {
            json!({ "type": "string", "format": "date-time" })
        }
        "uri" | "url" => json!({ "type": "string", "format": "uri" }),
        _ => json!({ "type": "string", "title": name }),
    }
}

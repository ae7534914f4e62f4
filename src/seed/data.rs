use anyhow::Result;
use serde_json::{json, Value};

use crate::error::EditorError;
use crate::model::SchemaNode;
use crate::store::MemoryStore;

/// Resolved descriptor for the literature index, the shape the editor is
/// exercised against. Mirrors the fields curators actually bulk-edit.
pub fn literature_descriptor() -> Value {
    json!({
        "type": "object",
        "properties": {
            "_collections": {"type": "array", "items": {"type": "string"}},
            "abstracts": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "source": {"type": "string"},
                        "value": {"type": "string"}
                    },
                    "required": ["value"]
                }
            },
            "arxiv_eprints": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "categories": {"type": "array", "items": {"type": "string"}},
                        "value": {"type": "string"}
                    }
                }
            },
            "authors": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "affiliations": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "curated_relation": {"type": "boolean"},
                                    "value": {"type": "string"}
                                }
                            }
                        },
                        "full_name": {"type": "string"},
                        "signature_block": {"type": "string"}
                    }
                }
            },
            "citeable": {"type": "boolean"},
            "core": {"type": "boolean"},
            "corporate_author": {"type": "array", "items": {"type": "string"}},
            "document_type": {"type": "array", "items": {"type": "string"}},
            "inspire_categories": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {"term": {"type": "string"}}
                }
            },
            "number_of_pages": {"type": "integer"},
            "preprint_date": {"type": "string"},
            "public_notes": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {"value": {"type": "string"}}
                }
            },
            "references": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "reference": {
                            "type": "object",
                            "properties": {
                                "collaborations": {
                                    "type": "array",
                                    "items": {"type": "string"}
                                },
                                "title": {
                                    "type": "object",
                                    "properties": {"title": {"type": "string"}}
                                }
                            }
                        }
                    }
                }
            },
            "self": {
                "type": "object",
                "properties": {"$ref": {"type": "string"}}
            },
            "texkeys": {"type": "array", "items": {"type": "string"}},
            "titles": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "subtitle": {"type": "string"},
                        "title": {"type": "string"}
                    },
                    "required": ["title"]
                }
            }
        }
    })
}

pub fn literature_schema() -> Result<SchemaNode, EditorError> {
    SchemaNode::from_value(&literature_descriptor())
}

/// A handful of demonstration records in the literature shape.
pub fn sample_records() -> Vec<(String, Value)> {
    vec![
        (
            "1001".to_string(),
            json!({
                "core": true,
                "document_type": ["article"],
                "titles": [{"title": "On the quantization of gravity"}],
                "authors": [
                    {
                        "full_name": "Banner, M.",
                        "signature_block": "BANARo",
                        "affiliations": [{"value": "INFN, Rome"}, {"value": "Rome"}]
                    },
                    {
                        "full_name": "Mann, L.",
                        "signature_block": "MANl",
                        "affiliations": [{"value": "Rome U."}]
                    }
                ],
                "texkeys": ["Banner:2016abc"]
            }),
        ),
        (
            "1002".to_string(),
            json!({
                "core": false,
                "citeable": true,
                "document_type": ["book chapter"],
                "titles": [{"title": "Variational principles"}],
                "number_of_pages": 184,
                "public_notes": [{"value": "Preliminary results"}],
                "inspire_categories": [{"term": "Theory-HEP"}]
            }),
        ),
        (
            "1003".to_string(),
            json!({
                "core": true,
                "document_type": ["article"],
                "titles": [{"title": "Collider signatures"}],
                "references": [
                    {"reference": {"collaborations": ["ATLAS", "CMS"]}},
                    {"reference": {"collaborations": ["LHCb"]}}
                ]
            }),
        ),
    ]
}

/// Load the demonstration schema and records into an in-memory store.
pub fn load_seed_data(store: &MemoryStore) -> Result<()> {
    store.insert_schema("literature", literature_schema()?);
    for (id, document) in sample_records() {
        store.insert_record(id, "literature", document);
    }
    Ok(())
}

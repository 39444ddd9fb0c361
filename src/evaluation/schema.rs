use jsonschema::JSONSchema;
use serde_json::{Map, Value, json};

use crate::evaluation::types::Evaluation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFieldKind {
    Text,
    Integer,
    Rubric,
}

/// One top-level field the analysis service must return.
#[derive(Debug, Clone, Copy)]
pub struct OutputField {
    pub name: &'static str,
    pub kind: OutputFieldKind,
    pub description: &'static str,
}

/// One part of the OREO rubric, keyed by its `oreoAnalysis` property name.
#[derive(Debug, Clone, Copy)]
pub struct RubricPart {
    pub key: &'static str,
    pub letter: char,
    pub name: &'static str,
    pub question: &'static str,
    pub description: &'static str,
}

pub const OREO_PARTS: [RubricPart; 4] = [
    RubricPart {
        key: "opinion",
        letter: 'O',
        name: "Opinion",
        question: "Is the main argument or central thought clearly stated?",
        description: "Clear main point or opinion",
    },
    RubricPart {
        key: "reason",
        letter: 'R',
        name: "Reason",
        question: "Is there a logical reason given for why the student thinks so?",
        description: "Logical reason provided",
    },
    RubricPart {
        key: "example",
        letter: 'E',
        name: "Example",
        question: "Is there a specific example from the text or personal experience supporting the reason?",
        description: "Specific example or evidence provided",
    },
    RubricPart {
        key: "opinionRestated",
        letter: 'O',
        name: "Opinion Restated",
        question: "Is the opinion restated, or a concluding thought or suggestion offered, at the end?",
        description: "Conclusion or restatement provided",
    },
];

pub const OUTPUT_FIELDS: [OutputField; 5] = [
    OutputField {
        name: "summary",
        kind: OutputFieldKind::Text,
        description: "A one sentence summary of what the student wrote, in Korean",
    },
    OutputField {
        name: "oreoAnalysis",
        kind: OutputFieldKind::Rubric,
        description: "One boolean per OREO part; false whenever the part is weak, vague, implicit, or missing",
    },
    OutputField {
        name: "score",
        kind: OutputFieldKind::Integer,
        description: "Integer score out of 100 for logical flow and sincerity, with points deducted for missing OREO parts",
    },
    OutputField {
        name: "constructiveFeedback",
        kind: OutputFieldKind::Text,
        description: "Specific advice in Korean that names which OREO part was weak and explains how to fix it",
    },
    OutputField {
        name: "encouragement",
        kind: OutputFieldKind::Text,
        description: "A warm, motivating closing comment in Korean",
    },
];

pub fn evaluation_json_schema() -> Value {
    let rubric_properties = OREO_PARTS
        .iter()
        .map(|part| {
            (
                part.key.to_string(),
                json!({ "type": "boolean", "description": part.description }),
            )
        })
        .collect::<Map<String, Value>>();
    let rubric_required = OREO_PARTS.iter().map(|part| part.key).collect::<Vec<_>>();

    let properties = OUTPUT_FIELDS
        .iter()
        .map(|field| {
            let property = match field.kind {
                OutputFieldKind::Text => {
                    json!({ "type": "string", "description": field.description })
                }
                OutputFieldKind::Integer => {
                    json!({ "type": "integer", "description": field.description })
                }
                OutputFieldKind::Rubric => json!({
                    "type": "object",
                    "description": field.description,
                    "properties": rubric_properties,
                    "required": rubric_required,
                    "additionalProperties": false
                }),
            };
            (field.name.to_string(), property)
        })
        .collect::<Map<String, Value>>();
    let required = OUTPUT_FIELDS
        .iter()
        .map(|field| field.name)
        .collect::<Vec<_>>();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false
    })
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaViolation {
    #[error("payload is not valid JSON: {0}")]
    NotJson(#[source] serde_json::Error),
    #[error("{}", .0.join("; "))]
    Constraint(Vec<String>),
    #[error("payload does not deserialize into an evaluation: {0}")]
    Shape(#[source] serde_json::Error),
}

/// Open copy of a schema document used to check what comes back: every
/// `additionalProperties` is removed, so keys the service adds beyond the
/// required ones do not reject an otherwise valid result.
pub fn to_validation_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| key.as_str() != "additionalProperties")
                .map(|(key, value)| (key.clone(), to_validation_schema(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(to_validation_schema).collect()),
        other => other.clone(),
    }
}

/// [`evaluation_json_schema`] as sent to the service, plus its compiled
/// open form used to check what comes back.
pub struct EvaluationSchema {
    document: Value,
    compiled: JSONSchema,
}

impl EvaluationSchema {
    pub fn compile() -> anyhow::Result<Self> {
        let document = evaluation_json_schema();
        let compiled = JSONSchema::compile(&to_validation_schema(&document))
            .map_err(|e| anyhow::anyhow!("failed to compile evaluation schema: {e}"))?;
        Ok(Self { document, compiled })
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn parse(&self, text: &str) -> Result<Evaluation, SchemaViolation> {
        let candidate: Value = serde_json::from_str(text.trim()).map_err(SchemaViolation::NotJson)?;

        if let Err(errors) = self.compiled.validate(&candidate) {
            let messages = errors
                .map(|error| format!("{} at '{}'", error, error.instance_path))
                .collect::<Vec<_>>();
            return Err(SchemaViolation::Constraint(messages));
        }

        serde_json::from_value(candidate).map_err(SchemaViolation::Shape)
    }
}

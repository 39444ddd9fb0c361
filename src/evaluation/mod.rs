pub mod schema;
pub mod types;

pub use schema::{
    EvaluationSchema, OREO_PARTS, OUTPUT_FIELDS, OutputField, OutputFieldKind, RubricPart,
    SchemaViolation, evaluation_json_schema, to_validation_schema,
};
pub use types::{Evaluation, OreoAnalysis, ReflectionInput};

//! Plan management: schema validation, prompt building, generation,
//! ingestion and the service layer tying them together.

pub mod gemini;
pub mod generator;
pub mod ingest;
pub mod prompt;
pub mod schema;
pub mod service;
pub mod template;

pub use gemini::GeminiPlanGenerator;
pub use generator::{GenerationError, PlanGenerator};
pub use ingest::{NutritionDayEntry, PlanAggregate, WorkoutDayEntry, ingest_plan, load_aggregate};
pub use prompt::build_plan_prompt;
pub use schema::{PlanDocument, SchemaIssue, SchemaValidationError, validate_plan_document};
pub use service::{PlanDetail, create_plan, delete_plan, get_plan_aggregate, list_plans};
pub use template::TemplatePlanGenerator;

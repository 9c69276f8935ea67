//! Turning a request into a stored roadmap, one stage per submodule.
//!
//! ```text
//! RoadmapRequest
//!     |  prompt::build_prompt
//!     v
//! prompt text --GenerationClient--> raw text
//!     |  parser::parse_response
//!     v
//! serde_json::Value
//!     |  schema::validate_roadmap
//!     v
//! RoadmapDraft
//!     |  sanitize::sanitize_draft
//!     v
//! RoadmapDraft (clean) --RoadmapStore::create--> Roadmap row
//! ```

pub mod parser;
pub mod prompt;
pub mod sanitize;
pub mod schema;
pub mod store;

pub use parser::{ParseError, parse_response};
pub use prompt::build_prompt;
pub use sanitize::{sanitize_draft, sanitize_text};
pub use schema::{RoadmapDraft, SchemaError, SchemaProblem, validate_roadmap};
pub use store::RoadmapStore;

//! Text-generation collaborator and response drafting
//!
//! - `TextGenerator`: the single `generate(prompt)` call the core consumes
//! - `ResponseDrafter`: applies generated text to incidents
//! - `parse_json_response`: best-effort JSON extraction from replies

mod drafter;
mod errors;
mod generator;
mod reply;

pub use drafter::ResponseDrafter;
pub use errors::{GenerationError, GenerationResult};
pub use generator::{FixedReply, TextGenerator};
pub use reply::{parse_json_response, JsonReply, INVALID_JSON_RESPONSE};

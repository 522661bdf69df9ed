//! Lecturegen Core Library
//!
//! Turns a biology topic into a lecture prompt, sends it to an AI text
//! provider, and normalizes whatever comes back into a displayable result.

pub mod error;
pub mod format;
pub mod normalize;
pub mod prompt;
pub mod provider;
pub mod service;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{LectureError, Result};
pub use format::{format_lecture_readable, format_response_readable};
pub use normalize::{INVALID_JSON_WARNING, LectureResponse, normalize_response, strip_code_fences};
pub use prompt::build_lecture_prompt;
pub use provider::{HttpTextGenerator, Provider, ProviderConfig, TextGenerator};
pub use service::LectureService;
pub use types::{LectureDocument, LectureRequest, MAX_TOPIC_CHARS, OutputMode};

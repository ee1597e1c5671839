//! Helpers backing the management page
//!
//! - [`loading`]: delayed show/hide of the full-page loading overlay
//! - [`form`]: form snapshot to JSON object serialization
//! - [`format`]: numeric/JSON predicates and title casing

pub mod form;
pub mod format;
pub mod loading;

pub use form::{form_to_json, Control, Form, FormSource, InputKind};
pub use format::{is_json, is_numeric, parse_json, title_case, JsonCheckError};
pub use loading::{DisplayStyle, LoadingOverlay, Page, TimerHost, TokioTimer, LOADING_OVERLAY_ID};

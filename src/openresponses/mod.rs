// OpenResponses API Module
// Wire types of the Open Responses API: requests, responses, items and events.
// Reference: https://www.openresponses.org/specification

mod common;
mod content;
mod events;
mod items;
mod request;
mod response;
mod tools;

pub use common::*;
pub use content::*;
pub use events::*;
pub use items::*;
pub use request::*;
pub use response::*;
pub use tools::*;

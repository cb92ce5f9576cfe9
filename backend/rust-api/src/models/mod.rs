pub mod hint;
pub mod schema;

pub use hint::{HintRequest, HintResponse};
pub use schema::OutputSchema;

pub mod parser;
pub mod prompts;
pub mod rating;

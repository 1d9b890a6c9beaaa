pub mod auth;
pub mod github;
pub mod openai;
pub mod probe;

pub mod advisor;
pub mod default_engine;
pub mod handlers;
pub mod normalizer;
pub mod prompts;
pub mod resolver;
pub mod validation;

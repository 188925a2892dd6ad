pub mod handlers;
pub mod planner;
pub mod prompts;

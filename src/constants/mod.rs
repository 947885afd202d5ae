pub mod messages;
pub mod prompts;
pub mod quiz_prompt;

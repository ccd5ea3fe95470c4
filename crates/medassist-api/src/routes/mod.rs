pub mod chatbot;
pub mod conversations;
pub mod health;
pub mod medications;

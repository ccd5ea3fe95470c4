pub mod conversation;
pub mod medication;

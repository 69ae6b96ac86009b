pub mod analysis;
pub mod data;
pub mod llm;
pub mod tools;

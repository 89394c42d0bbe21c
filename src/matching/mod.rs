pub mod engine;
pub mod vocabulary;

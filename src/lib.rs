pub mod bibtex;
pub mod cli;
pub mod commands;
pub mod common;
pub mod concise;
pub mod corpus;
pub mod resolve;

pub mod builder;
pub mod html_parser;
pub mod knowledge_model;
pub mod store;

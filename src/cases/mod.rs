pub mod case_model;
pub mod generator;
pub mod llm;
pub mod validator;

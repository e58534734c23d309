pub mod admin;
pub mod booth;
pub mod error;
pub mod models;
pub mod play;
pub mod question_store;
pub mod settings;

pub mod admin;
pub mod play;
pub mod settings;

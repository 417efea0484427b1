pub mod settings;
pub mod switch;

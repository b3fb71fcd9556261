pub mod config_cmd;
pub mod generate;
pub mod render;
pub mod tools;

pub mod json;
pub mod money;
pub mod time;

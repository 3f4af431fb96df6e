pub mod frame;
pub mod style;

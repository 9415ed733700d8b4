pub mod console;
pub mod views;

pub use console::Console;

pub mod attribution;
pub mod events;
pub mod history;
pub mod state;

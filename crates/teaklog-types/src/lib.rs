pub mod diagnostic;
pub mod line;
pub mod transition;

pub use diagnostic::*;
pub use line::*;
pub use transition::*;

pub mod diabetes;
pub mod enums;
pub mod patient;
pub mod ulcer;

pub use diabetes::*;
pub use enums::*;
pub use patient::*;
pub use ulcer::*;

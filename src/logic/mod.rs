pub mod attendance;
pub mod format;
pub mod grading;
pub mod summary;

pub use attendance::*;
pub use format::*;
pub use grading::*;
pub use summary::*;

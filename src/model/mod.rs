pub mod attendance;
pub mod class_section;
pub mod common;
pub mod field_map;
pub mod grade;
pub mod student;

pub use attendance::*;
pub use class_section::*;
pub use common::*;
pub use field_map::*;
pub use grade::*;
pub use student::*;

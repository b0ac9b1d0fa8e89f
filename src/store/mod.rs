pub mod memory;
pub mod remote;
pub mod traits;

pub use memory::*;
pub use remote::*;
pub use traits::*;

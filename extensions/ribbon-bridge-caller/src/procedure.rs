mod traits;
pub use traits::*;

pub mod lookup;
pub mod session;

pub use lookup::*;
pub use session::*;

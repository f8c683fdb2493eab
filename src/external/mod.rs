pub mod esewa;
pub mod stripe;

pub use self::esewa::*;
pub use self::stripe::*;

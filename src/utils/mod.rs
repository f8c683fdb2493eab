pub mod customization;
pub mod jwt;
pub mod password;
pub mod pricing;
pub mod validation;

pub use jwt::*;
pub use password::*;
pub use validation::*;

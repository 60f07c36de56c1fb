//! Token handling shared by Moodfeed services
//!
//! Services validate bearer tokens issued by the account service. The only
//! supported scheme is HS256 with a shared secret.

pub mod jwt;

pub use jwt::{Claims, JwtError};

pub mod jwt;

pub use jwt::{Claims, JwtAuth, JwtVerifier};

pub mod jwt;

pub use jwt::JwtIdentityResolver;

pub mod authorize;
pub mod echo;
pub mod health;

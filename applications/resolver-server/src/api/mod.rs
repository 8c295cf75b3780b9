/// API route modules
pub mod health;
pub mod playlist;
pub mod resolve;

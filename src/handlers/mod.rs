pub mod auth;
pub mod feeling_bot;
pub mod feelings;
pub mod health;
pub mod stats;
pub mod trails;

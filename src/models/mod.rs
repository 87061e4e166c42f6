pub mod feeling;
pub mod feeling_bot;
pub mod mood;
pub mod trail;
pub mod trail_execution;
pub mod user;

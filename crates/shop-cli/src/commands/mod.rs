pub mod context;
pub mod open;
pub mod session;

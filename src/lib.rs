pub mod agents;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod mail;
pub mod routes;
pub mod screening;
pub mod state;
pub mod storage;
pub mod templates;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use routes::build_router;

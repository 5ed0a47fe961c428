pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod context;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
pub mod testing;

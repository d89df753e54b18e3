pub mod config;
pub mod db;
pub mod domain;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;

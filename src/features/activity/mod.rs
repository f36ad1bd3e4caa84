pub mod dtos;
pub mod handlers;
pub mod ip;
pub mod models;
pub mod routes;
pub mod services;

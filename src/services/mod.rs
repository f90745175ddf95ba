//! Application services: the operations behind the HTTP handlers.

pub mod auth;
pub mod cart;
pub mod factory;
pub mod order;
pub mod review;
pub mod user;

// src/handlers/mod.rs

pub mod admin;
pub mod articles;
pub mod auth;

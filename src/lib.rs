//! Manga Gateway API Library
//!
//! This library proxies manga search and discovery to the Jikan catalog,
//! keeps a follower graph between users, and issues JWTs for protected routes.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod fixtures;
pub mod models;
pub mod parser;
pub mod routes;
pub mod social;

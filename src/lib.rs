pub mod api;
pub mod cli;
pub mod config;
pub mod context;
pub mod form;
pub mod journal;
pub mod pages;
pub mod schema;
pub mod shell;

// Handlers module - HTTP endpoint handlers

pub mod pages;
pub mod registry;

pub mod classes;
pub mod config;
pub mod core;
pub mod desks;
pub mod groups;
pub mod layout;
pub mod picker;

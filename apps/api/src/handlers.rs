pub mod access;
pub mod catalog;
pub mod health;
pub mod overrides;

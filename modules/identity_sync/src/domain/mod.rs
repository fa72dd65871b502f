pub mod error;
pub mod event;
pub mod repo;
pub mod service;
pub mod signature;

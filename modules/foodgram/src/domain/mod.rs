pub mod error;
pub mod permissions;
pub mod repo;
pub mod service;
pub mod shopping_list;
pub mod validation;

//! Repository implementations over SeaORM.

pub mod entities;
pub mod user_repository;

pub use user_repository::{UserRepository, UserStore};

#[cfg(test)]
pub use user_repository::MockUserRepository;

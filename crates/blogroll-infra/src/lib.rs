//! # Blogroll Infrastructure
//!
//! Concrete implementations of the ports defined in `blogroll-core`.
//! This crate contains database, cache, media and authentication integrations.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory only
//! - `postgres` - PostgreSQL database support via SeaORM
//! - `redis` - Redis-backed page cache

pub mod auth;
pub mod cache;
pub mod database;
pub mod media;

// Re-exports - In-Memory
pub use cache::InMemoryCache;
pub use database::MemoryDatabase;
pub use media::{InMemoryMediaStorage, LocalMediaStorage};

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

#[cfg(feature = "postgres")]
pub use database::DatabaseConnections;

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use cache::{RedisCache, RedisConfig};

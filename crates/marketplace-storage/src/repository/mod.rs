//! # Repository Module
//!
//! SQL lives here, behind small typed repositories handed out by
//! [`Database`](crate::Database).
//!
//! - [`KeyValueRepository`](kv::KeyValueRepository) - the `kv_store` table

pub mod kv;

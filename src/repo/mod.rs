//! Typed repositories, one per entity. Every query that touches user data
//! is scoped to the owning user here, so handlers cannot forget it.

pub mod entries;
pub mod images;
pub mod profiles;
pub mod sessions;
pub mod users;

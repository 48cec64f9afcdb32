//! Domain types and the collaborator ports the client talks to.

pub mod card;
pub mod conversion;
pub mod currency;
pub mod draft;
pub mod enrollment;
pub mod ports;
pub mod session;
pub mod transaction;

mod admin;
mod pages;
mod public;
pub mod response;
mod router;

pub use router::{AppState, create_router};

pub mod adapter;
pub mod client;
pub mod collection;
mod record;

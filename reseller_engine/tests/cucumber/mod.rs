mod setups;
mod store_world;

pub use store_world::{StoreSystem, StoreWorld};

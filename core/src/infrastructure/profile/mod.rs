pub mod local_store;
#[cfg(test)]
pub mod memory;

pub use local_store::LocalProfileRepository;

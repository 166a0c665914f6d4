pub mod db;
pub mod identity;
pub mod memory;

pub use db::DbAdapter;
pub use identity::IdentityToolkitAdapter;
pub use memory::MemoryAdapter;

#[cfg(test)]
pub(crate) mod test_db;

pub mod docs;
pub mod orders;

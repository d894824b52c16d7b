pub mod plant;
pub mod sync;

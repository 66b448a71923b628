pub mod conversation;
pub mod record;

pub use conversation::*;
pub use record::*;

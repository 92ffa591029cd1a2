pub mod creator;
pub mod validation;

pub use creator::{CreatorData, CreatorProfile, Video};

pub mod error;
pub mod keys;
pub mod program;
pub mod scene;
pub mod value;

pub use error::HiHippoError;
pub use keys::*;
pub use program::*;
pub use scene::*;
pub use value::*;

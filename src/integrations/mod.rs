//! External service integrations.

pub mod ceidg_client {
    pub use crate::ceidg_client::*;
}

pub mod classifier {
    pub use crate::classifier::*;
}

// Domain-layer modules and shared errors/models
pub mod nip {
    pub use crate::nip::*;
}

pub mod mapping {
    pub use crate::mapping::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod services {
    pub use crate::services::*;
}

pub mod errors {
    pub use crate::errors::*;
}

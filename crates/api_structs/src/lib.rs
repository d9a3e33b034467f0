mod status;
mod worker;

pub mod dtos {
    pub use crate::worker::dtos::*;
}

pub use crate::status::api::*;
pub use crate::worker::api::*;

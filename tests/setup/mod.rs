#![allow(dead_code)]
pub mod accounts;
pub mod test_data;

pub use accounts::*;
pub use fixture::*;
pub use instructions::*;

pub mod model;
pub mod reversal;
pub mod traits;

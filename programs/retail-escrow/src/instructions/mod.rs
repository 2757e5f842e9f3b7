pub mod initialize_escrow;
pub mod release_escrow;
pub mod refund_escrow;
mod settle;

pub use initialize_escrow::*;
pub use release_escrow::*;
pub use refund_escrow::*;

#![allow(unexpected_cfgs, deprecated)]
use anchor_lang::prelude::*;

declare_id!("BjNAQd5f4YCY963A1CNscxGLTKFToSeyCoSXxh6QjzgS");

pub mod authority;
pub mod custody;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod machine;
pub mod state;

use instructions::*;

#[program]
pub mod retail_escrow {
    use super::*;

    /// Open an escrow and lock the buyer's payment in custody
    ///
    /// # Arguments
    /// * `escrow_id` - Instance identifier; the record address is derived from it
    /// * `amount` - Token amount moved from the buyer into custody
    /// * `retailer` - Party paid on release
    /// * `arbiter` - Optional third party allowed to release or refund
    pub fn initialize_escrow(
        ctx: Context<InitializeEscrow>,
        escrow_id: u64,
        amount: u64,
        retailer: Pubkey,
        arbiter: Option<Pubkey>,
    ) -> Result<()> {
        instructions::initialize_escrow::initialize_escrow(ctx, escrow_id, amount, retailer, arbiter)
    }

    /// Pay custody out to the retailer (buyer or arbiter signs)
    pub fn release_escrow(ctx: Context<ReleaseEscrow>, escrow_id: u64) -> Result<()> {
        instructions::release_escrow::release_escrow(ctx, escrow_id)
    }

    /// Return custody to the buyer (retailer or arbiter signs)
    pub fn refund_escrow(ctx: Context<RefundEscrow>, escrow_id: u64) -> Result<()> {
        instructions::refund_escrow::refund_escrow(ctx, escrow_id)
    }
}

use anchor_lang::prelude::*;

#[event]
pub struct EscrowInitialized {
    pub escrow: Pubkey,
    pub escrow_id: u64,
    pub buyer: Pubkey,
    pub retailer: Pubkey,
    pub mint: Pubkey,
    pub amount: u64,
}

#[event]
pub struct EscrowReleased {
    pub escrow: Pubkey,
    pub escrow_id: u64,
    pub retailer: Pubkey,
    pub authority: Pubkey,
    pub amount: u64,
}

#[event]
pub struct EscrowRefunded {
    pub escrow: Pubkey,
    pub escrow_id: u64,
    pub buyer: Pubkey,
    pub authority: Pubkey,
    pub amount: u64,
}

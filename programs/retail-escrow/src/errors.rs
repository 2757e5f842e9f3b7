use anchor_lang::prelude::*;

#[error_code]
pub enum EscrowError {
    #[msg("Escrow account does not match the address derived from the escrow id")]
    AddressMismatch,

    #[msg("Escrow already initialized")]
    AlreadyInitialized,

    #[msg("Unauthorized")]
    Unauthorized,

    #[msg("Token account owner or mint does not match the escrow")]
    AccountMismatch,

    #[msg("Insufficient funds for the escrow deposit")]
    InsufficientFunds,

    #[msg("Escrow not in correct state")]
    InvalidState,

    #[msg("Amount must be greater than zero")]
    InvalidAmount,

    #[msg("Retailer must differ from the buyer")]
    InvalidRetailer,

    #[msg("Arbiter must differ from the buyer and the retailer")]
    InvalidArbiter,

    #[msg("Custody account already holds tokens")]
    CustodyNotEmpty,
}

//! Escrow address derivation and the account checks run before any state
//! change or token movement.
//!
//! Checks operate on plain keys and [`TokenAccountView`] snapshots so the
//! instruction handlers and the host tests run the same code.

use anchor_lang::prelude::*;
use anchor_spl::associated_token::get_associated_token_address_with_program_id;
use anchor_spl::token_interface::TokenAccount;

use crate::errors::EscrowError;
use crate::state::EscrowRecord;

/// The token account fields the escrow checks read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenAccountView {
    pub key: Pubkey,
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
}

impl<'info> From<&InterfaceAccount<'info, TokenAccount>> for TokenAccountView {
    fn from(account: &InterfaceAccount<'info, TokenAccount>) -> Self {
        let data: &TokenAccount = account;
        Self {
            key: account.key(),
            mint: data.mint,
            owner: data.owner,
            amount: data.amount,
        }
    }
}

/// Derive the escrow record address and bump for `escrow_id` under `program_id`.
pub fn derive_escrow_address(program_id: &Pubkey, escrow_id: u64) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[EscrowRecord::SEED_PREFIX, escrow_id.to_le_bytes().as_ref()],
        program_id,
    )
}

/// Escrow record address for `escrow_id` under this program.
pub fn escrow_address(escrow_id: u64) -> (Pubkey, u8) {
    derive_escrow_address(&crate::ID, escrow_id)
}

/// The custody account: associated token account of the escrow address.
pub fn derive_custody_address(escrow: &Pubkey, mint: &Pubkey, token_program: &Pubkey) -> Pubkey {
    get_associated_token_address_with_program_id(escrow, mint, token_program)
}

/// Custody account address for `escrow_id` under this program.
pub fn custody_address(escrow_id: u64, mint: &Pubkey, token_program: &Pubkey) -> Pubkey {
    let (escrow, _) = escrow_address(escrow_id);
    derive_custody_address(&escrow, mint, token_program)
}

/// Verify `supplied` is the record address for `escrow_id`, returning the bump.
pub fn check_escrow_address(program_id: &Pubkey, supplied: &Pubkey, escrow_id: u64) -> Result<u8> {
    let (expected, bump) = derive_escrow_address(program_id, escrow_id);
    require_keys_eq!(*supplied, expected, EscrowError::AddressMismatch);
    Ok(bump)
}

/// Verify nothing has been allocated at the record address yet.
pub fn check_record_vacant(owner: &Pubkey, data_len: usize) -> Result<()> {
    require!(
        *owner == System::id() && data_len == 0,
        EscrowError::AlreadyInitialized
    );
    Ok(())
}

pub fn check_signer(is_signer: bool) -> Result<()> {
    require!(is_signer, EscrowError::Unauthorized);
    Ok(())
}

/// Verify a token account belongs to `owner` and holds `mint`.
pub fn check_token_account(account: &TokenAccountView, owner: &Pubkey, mint: &Pubkey) -> Result<()> {
    require_keys_eq!(account.owner, *owner, EscrowError::AccountMismatch);
    require_keys_eq!(account.mint, *mint, EscrowError::AccountMismatch);
    Ok(())
}

/// Verify `account` is the custody account of `escrow` for `mint`.
///
/// Any other token account owned by the escrow address is rejected, so a
/// settlement always drains the account funded at creation.
pub fn check_custody_account(
    account: &TokenAccountView,
    escrow: &Pubkey,
    mint: &Pubkey,
    token_program: &Pubkey,
) -> Result<()> {
    require_keys_eq!(
        account.key,
        derive_custody_address(escrow, mint, token_program),
        EscrowError::AccountMismatch
    );
    check_token_account(account, escrow, mint)
}

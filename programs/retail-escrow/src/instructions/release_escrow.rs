use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::authority::derive_custody_address;
use crate::errors::*;
use crate::events::EscrowReleased;
use crate::machine::Settlement;
use crate::state::*;
use super::settle::settle_with_cpi;

/// Release custody to the retailer once delivery is confirmed
pub fn release_escrow(ctx: Context<ReleaseEscrow>, escrow_id: u64) -> Result<()> {
    let accounts = &mut *ctx.accounts;

    let amount = settle_with_cpi(
        ctx.program_id,
        Settlement::Release,
        escrow_id,
        &accounts.authority,
        &mut accounts.escrow_record,
        &accounts.mint,
        &accounts.custody_token_account,
        &accounts.retailer_token_account,
        &accounts.token_program,
    )?;

    emit!(EscrowReleased {
        escrow: accounts.escrow_record.key(),
        escrow_id,
        retailer: accounts.escrow_record.retailer,
        authority: accounts.authority.key(),
        amount,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct ReleaseEscrow<'info> {
    /// The buyer confirming delivery, or the escrow arbiter
    pub authority: Signer<'info>,

    /// Escrow record PDA
    #[account(mut)]
    pub escrow_record: Account<'info, EscrowRecord>,

    /// Mint of the escrowed token
    #[account(
        address = escrow_record.mint @ EscrowError::AccountMismatch,
        mint::token_program = token_program,
    )]
    pub mint: InterfaceAccount<'info, Mint>,

    /// Custody token account owned by the escrow PDA
    #[account(
        mut,
        address = derive_custody_address(
            &escrow_record.key(),
            &escrow_record.mint,
            &token_program.key(),
        ) @ EscrowError::AccountMismatch,
    )]
    pub custody_token_account: InterfaceAccount<'info, TokenAccount>,

    /// Retailer's token account receiving the payout
    #[account(mut)]
    pub retailer_token_account: InterfaceAccount<'info, TokenAccount>,

    /// Token program
    pub token_program: Interface<'info, TokenInterface>,
}

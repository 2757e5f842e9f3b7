use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::authority::derive_custody_address;
use crate::errors::*;
use crate::events::EscrowRefunded;
use crate::machine::Settlement;
use crate::state::*;
use super::settle::settle_with_cpi;

/// Return custody to the buyer
pub fn refund_escrow(ctx: Context<RefundEscrow>, escrow_id: u64) -> Result<()> {
    let accounts = &mut *ctx.accounts;

    let amount = settle_with_cpi(
        ctx.program_id,
        Settlement::Refund,
        escrow_id,
        &accounts.authority,
        &mut accounts.escrow_record,
        &accounts.mint,
        &accounts.custody_token_account,
        &accounts.buyer_token_account,
        &accounts.token_program,
    )?;

    emit!(EscrowRefunded {
        escrow: accounts.escrow_record.key(),
        escrow_id,
        buyer: accounts.escrow_record.buyer,
        authority: accounts.authority.key(),
        amount,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct RefundEscrow<'info> {
    /// The retailer giving up the payment, or the escrow arbiter
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

    /// Buyer's token account receiving the refund
    #[account(mut)]
    pub buyer_token_account: InterfaceAccount<'info, TokenAccount>,

    /// Token program
    pub token_program: Interface<'info, TokenInterface>,
}

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::authority::TokenAccountView;
use crate::custody::CpiCustody;
use crate::machine::{self, Settlement, SettlementAccounts};
use crate::state::*;

/// Shared body of release and refund: drain custody to `destination`,
/// signing as the escrow PDA.
#[allow(clippy::too_many_arguments)]
pub(crate) fn settle_with_cpi<'info>(
    program_id: &Pubkey,
    settlement: Settlement,
    escrow_id: u64,
    authority: &Signer<'info>,
    escrow_record: &mut Account<'info, EscrowRecord>,
    mint: &InterfaceAccount<'info, Mint>,
    custody_token_account: &InterfaceAccount<'info, TokenAccount>,
    destination: &InterfaceAccount<'info, TokenAccount>,
    token_program: &Interface<'info, TokenInterface>,
) -> Result<u64> {
    let clock = Clock::get()?;

    let accounts = SettlementAccounts {
        escrow: escrow_record.key(),
        authority: authority.key(),
        authority_is_signer: authority.is_signer,
        custody: TokenAccountView::from(custody_token_account),
        destination: TokenAccountView::from(destination),
        token_program: token_program.key(),
    };

    let id_bytes = escrow_record.escrow_id.to_le_bytes();
    let bump = [escrow_record.bump];
    let seeds: &[&[u8]] = &[EscrowRecord::SEED_PREFIX, id_bytes.as_ref(), bump.as_ref()];
    let signer_seeds = &[seeds];

    let mut custody = CpiCustody::new(
        token_program.to_account_info(),
        mint.to_account_info(),
        mint.decimals,
        vec![
            custody_token_account.to_account_info(),
            destination.to_account_info(),
            escrow_record.to_account_info(),
        ],
    )
    .with_signer(signer_seeds);

    machine::settle_escrow(
        program_id,
        escrow_record,
        escrow_id,
        settlement,
        &accounts,
        clock.unix_timestamp,
        &mut custody,
    )
}

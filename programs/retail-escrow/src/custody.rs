use anchor_lang::prelude::*;
use anchor_spl::token_interface::{transfer_checked, TransferChecked};

use crate::errors::EscrowError;

/// Moves token balances on behalf of the escrow state machine.
///
/// Implementations perform exactly one transfer per call and never retry;
/// errors from the token program are returned unchanged.
pub trait TokenCustody {
    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, authority: &Pubkey, amount: u64) -> Result<()>;
}

/// Custody backed by a `transfer_checked` CPI into the token program.
///
/// Accounts are resolved by key from the set handed over by the
/// instruction. Signer seeds are attached to every CPI so the escrow
/// address can authorize payouts from custody.
pub struct CpiCustody<'a, 'info> {
    token_program: AccountInfo<'info>,
    mint: AccountInfo<'info>,
    decimals: u8,
    accounts: Vec<AccountInfo<'info>>,
    signer_seeds: &'a [&'a [&'a [u8]]],
}

impl<'a, 'info> CpiCustody<'a, 'info> {
    pub fn new(
        token_program: AccountInfo<'info>,
        mint: AccountInfo<'info>,
        decimals: u8,
        accounts: Vec<AccountInfo<'info>>,
    ) -> Self {
        Self {
            token_program,
            mint,
            decimals,
            accounts,
            signer_seeds: &[],
        }
    }

    pub fn with_signer(mut self, signer_seeds: &'a [&'a [&'a [u8]]]) -> Self {
        self.signer_seeds = signer_seeds;
        self
    }

    fn account(&self, key: &Pubkey) -> Result<AccountInfo<'info>> {
        self.accounts
            .iter()
            .find(|account| account.key == key)
            .cloned()
            .ok_or_else(|| error!(EscrowError::AccountMismatch))
    }
}

impl TokenCustody for CpiCustody<'_, '_> {
    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, authority: &Pubkey, amount: u64) -> Result<()> {
        let cpi_accounts = TransferChecked {
            from: self.account(from)?,
            mint: self.mint.clone(),
            to: self.account(to)?,
            authority: self.account(authority)?,
        };

        let cpi_ctx = CpiContext::new_with_signer(
            self.token_program.clone(),
            cpi_accounts,
            self.signer_seeds,
        );

        transfer_checked(cpi_ctx, amount, self.decimals)
    }
}

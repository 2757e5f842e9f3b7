//! Escrow state machine.
//!
//! Every transition validates all of its preconditions first, then performs
//! its single custody transfer, and only then produces or mutates the
//! record. A failed transfer therefore leaves the record exactly as it was.

use anchor_lang::prelude::*;

use crate::authority::{
    check_custody_account, check_escrow_address, check_record_vacant, check_signer,
    check_token_account, TokenAccountView,
};
use crate::custody::TokenCustody;
use crate::errors::EscrowError;
use crate::state::*;

/// Arguments of an escrow opening, as chosen by the buyer.
#[derive(Clone, Copy, Debug)]
pub struct EscrowTerms {
    pub escrow_id: u64,
    pub amount: u64,
    pub retailer: Pubkey,
    pub arbiter: Option<Pubkey>,
}

/// Accounts presented to an escrow opening.
#[derive(Clone, Copy, Debug)]
pub struct OpeningAccounts {
    pub buyer: Pubkey,
    pub buyer_is_signer: bool,
    pub escrow: Pubkey,
    /// Current owner of the record address
    pub escrow_owner: Pubkey,
    /// Current data length at the record address
    pub escrow_data_len: usize,
    pub retailer: Pubkey,
    pub buyer_token: TokenAccountView,
    pub custody: TokenAccountView,
    /// Token program owning the custody account
    pub token_program: Pubkey,
}

/// Lock `terms.amount` from the buyer in custody and return the new record.
///
/// The caller persists the returned record at `accounts.escrow`.
pub fn initialize_escrow<C: TokenCustody>(
    program_id: &Pubkey,
    accounts: &OpeningAccounts,
    terms: &EscrowTerms,
    now: i64,
    custody: &mut C,
) -> Result<EscrowRecord> {
    let bump = check_escrow_address(program_id, &accounts.escrow, terms.escrow_id)?;
    check_record_vacant(&accounts.escrow_owner, accounts.escrow_data_len)?;
    check_signer(accounts.buyer_is_signer)?;

    require!(terms.amount > 0, EscrowError::InvalidAmount);
    require_keys_eq!(terms.retailer, accounts.retailer, EscrowError::AccountMismatch);
    require_keys_neq!(terms.retailer, accounts.buyer, EscrowError::InvalidRetailer);
    if let Some(arbiter) = terms.arbiter {
        require!(
            arbiter != accounts.buyer && arbiter != terms.retailer,
            EscrowError::InvalidArbiter
        );
    }

    let mint = accounts.custody.mint;
    check_custody_account(&accounts.custody, &accounts.escrow, &mint, &accounts.token_program)?;
    require!(accounts.custody.amount == 0, EscrowError::CustodyNotEmpty);
    check_token_account(&accounts.buyer_token, &accounts.buyer, &mint)?;
    require_gte!(
        accounts.buyer_token.amount,
        terms.amount,
        EscrowError::InsufficientFunds
    );

    custody.transfer(
        &accounts.buyer_token.key,
        &accounts.custody.key,
        &accounts.buyer,
        terms.amount,
    )?;

    msg!(
        "Escrow {} opened: {} locked by buyer {} for retailer {}",
        terms.escrow_id,
        terms.amount,
        accounts.buyer,
        terms.retailer
    );

    Ok(EscrowRecord {
        escrow_id: terms.escrow_id,
        buyer: accounts.buyer,
        retailer: terms.retailer,
        arbiter: terms.arbiter,
        mint,
        amount: terms.amount,
        state: EscrowState::AwaitingDelivery,
        created_ts: now,
        settled_ts: 0,
        bump,
    })
}

/// Terminal transition requested for an escrow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Settlement {
    /// Pay custody out to the retailer
    Release,
    /// Return custody to the buyer
    Refund,
}

impl Settlement {
    /// Owner of the token account that receives the custody balance
    pub fn payee(self, record: &EscrowRecord) -> Pubkey {
        match self {
            Settlement::Release => record.retailer,
            Settlement::Refund => record.buyer,
        }
    }

    pub fn authorizes(self, record: &EscrowRecord, key: &Pubkey) -> bool {
        match self {
            Settlement::Release => record.may_release(key),
            Settlement::Refund => record.may_refund(key),
        }
    }

    pub fn terminal_state(self) -> EscrowState {
        match self {
            Settlement::Release => EscrowState::Released,
            Settlement::Refund => EscrowState::Refunded,
        }
    }
}

/// Accounts presented to a release or refund.
#[derive(Clone, Copy, Debug)]
pub struct SettlementAccounts {
    pub escrow: Pubkey,
    pub authority: Pubkey,
    pub authority_is_signer: bool,
    pub custody: TokenAccountView,
    /// Token account of the payee
    pub destination: TokenAccountView,
    /// Token program owning the custody account
    pub token_program: Pubkey,
}

/// Drain custody to the payee of `settlement` and mark the record terminal.
///
/// Returns the amount moved.
pub fn settle_escrow<C: TokenCustody>(
    program_id: &Pubkey,
    record: &mut EscrowRecord,
    escrow_id: u64,
    settlement: Settlement,
    accounts: &SettlementAccounts,
    now: i64,
    custody: &mut C,
) -> Result<u64> {
    check_escrow_address(program_id, &accounts.escrow, escrow_id)?;
    require!(record.escrow_id == escrow_id, EscrowError::AddressMismatch);
    require!(record.is_awaiting_delivery(), EscrowError::InvalidState);

    check_signer(accounts.authority_is_signer)?;
    require!(
        settlement.authorizes(record, &accounts.authority),
        EscrowError::Unauthorized
    );

    check_custody_account(
        &accounts.custody,
        &accounts.escrow,
        &record.mint,
        &accounts.token_program,
    )?;
    check_token_account(&accounts.destination, &settlement.payee(record), &record.mint)?;
    require_gte!(
        accounts.custody.amount,
        record.amount,
        EscrowError::InsufficientFunds
    );

    let amount = accounts.custody.amount;
    custody.transfer(
        &accounts.custody.key,
        &accounts.destination.key,
        &accounts.escrow,
        amount,
    )?;

    record.state = settlement.terminal_state();
    record.settled_ts = now;

    msg!(
        "Escrow {} settled as {:?}: {} paid to {} by authority {}",
        escrow_id,
        record.state,
        amount,
        accounts.destination.owner,
        accounts.authority
    );

    Ok(amount)
}

use anchor_lang::prelude::*;
use anchor_lang::system_program::{
    allocate, assign, create_account, transfer, Allocate, Assign, CreateAccount, Transfer,
};
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::authority::TokenAccountView;
use crate::custody::CpiCustody;
use crate::events::EscrowInitialized;
use crate::machine::{self, EscrowTerms, OpeningAccounts};
use crate::state::*;

/// Open an escrow: lock `amount` of the buyer's tokens in custody for the retailer
pub fn initialize_escrow(
    ctx: Context<InitializeEscrow>,
    escrow_id: u64,
    amount: u64,
    retailer: Pubkey,
    arbiter: Option<Pubkey>,
) -> Result<()> {
    let accounts = &ctx.accounts;
    let clock = Clock::get()?;

    let opening = OpeningAccounts {
        buyer: accounts.buyer.key(),
        buyer_is_signer: accounts.buyer.is_signer,
        escrow: accounts.escrow_record.key(),
        escrow_owner: *accounts.escrow_record.owner,
        escrow_data_len: accounts.escrow_record.data_len(),
        retailer: accounts.retailer.key(),
        buyer_token: TokenAccountView::from(&accounts.buyer_token_account),
        custody: TokenAccountView::from(&accounts.custody_token_account),
        token_program: accounts.token_program.key(),
    };
    let terms = EscrowTerms {
        escrow_id,
        amount,
        retailer,
        arbiter,
    };

    // Deposit is authorized by the buyer's own signature
    let mut custody = CpiCustody::new(
        accounts.token_program.to_account_info(),
        accounts.mint.to_account_info(),
        accounts.mint.decimals,
        vec![
            accounts.buyer_token_account.to_account_info(),
            accounts.custody_token_account.to_account_info(),
            accounts.buyer.to_account_info(),
        ],
    );

    let record = machine::initialize_escrow(
        ctx.program_id,
        &opening,
        &terms,
        clock.unix_timestamp,
        &mut custody,
    )?;

    allocate_record(accounts, ctx.program_id, &record)?;

    emit!(EscrowInitialized {
        escrow: opening.escrow,
        escrow_id,
        buyer: record.buyer,
        retailer: record.retailer,
        mint: record.mint,
        amount,
    });

    msg!("Escrow record written at {}", opening.escrow);

    Ok(())
}

/// Create the record account at its derived address and write `record` into it.
///
/// The address may already hold lamports sent by anyone; in that case it is
/// topped up to rent exemption, then allocated and assigned.
fn allocate_record(
    accounts: &InitializeEscrow,
    program_id: &Pubkey,
    record: &EscrowRecord,
) -> Result<()> {
    let escrow_info = accounts.escrow_record.to_account_info();
    let buyer_info = accounts.buyer.to_account_info();
    let system_program = accounts.system_program.to_account_info();

    let id_bytes = record.escrow_id.to_le_bytes();
    let bump = [record.bump];
    let seeds: &[&[u8]] = &[EscrowRecord::SEED_PREFIX, id_bytes.as_ref(), bump.as_ref()];
    let signer_seeds = &[seeds];

    let space = EscrowRecord::LEN;
    let rent_lamports = accounts.rent.minimum_balance(space);
    let current_lamports = escrow_info.lamports();

    if current_lamports == 0 {
        create_account(
            CpiContext::new_with_signer(
                system_program,
                CreateAccount {
                    from: buyer_info,
                    to: escrow_info.clone(),
                },
                signer_seeds,
            ),
            rent_lamports,
            space as u64,
            program_id,
        )?;
    } else {
        let top_up = rent_lamports.saturating_sub(current_lamports);
        if top_up > 0 {
            transfer(
                CpiContext::new(
                    system_program.clone(),
                    Transfer {
                        from: buyer_info,
                        to: escrow_info.clone(),
                    },
                ),
                top_up,
            )?;
        }
        allocate(
            CpiContext::new_with_signer(
                system_program.clone(),
                Allocate {
                    account_to_allocate: escrow_info.clone(),
                },
                signer_seeds,
            ),
            space as u64,
        )?;
        assign(
            CpiContext::new_with_signer(
                system_program,
                Assign {
                    account_to_assign: escrow_info.clone(),
                },
                signer_seeds,
            ),
            program_id,
        )?;
    }

    let mut data = escrow_info.try_borrow_mut_data()?;
    record.try_serialize(&mut &mut data[..])?;

    Ok(())
}

#[derive(Accounts)]
pub struct InitializeEscrow<'info> {
    /// The buyer funding the escrow
    #[account(mut)]
    pub buyer: Signer<'info>,

    /// Escrow record PDA, allocated by the instruction
    /// CHECK: Address and vacancy validated in instruction before allocation
    #[account(mut)]
    pub escrow_record: UncheckedAccount<'info>,

    /// The retailer who will be paid on release
    /// CHECK: Identity only, compared against the retailer argument
    pub retailer: UncheckedAccount<'info>,

    /// Mint of the escrowed token
    #[account(
        mint::token_program = token_program,
    )]
    pub mint: InterfaceAccount<'info, Mint>,

    /// Buyer's token account funding the escrow
    #[account(mut)]
    pub buyer_token_account: InterfaceAccount<'info, TokenAccount>,

    /// Custody token account owned by the escrow PDA
    #[account(
        init_if_needed,
        payer = buyer,
        associated_token::mint = mint,
        associated_token::authority = escrow_record,
        associated_token::token_program = token_program,
    )]
    pub custody_token_account: InterfaceAccount<'info, TokenAccount>,

    /// Token program
    pub token_program: Interface<'info, TokenInterface>,

    /// Associated token program
    pub associated_token_program: Program<'info, AssociatedToken>,

    /// System program
    pub system_program: Program<'info, System>,

    pub rent: Sysvar<'info, Rent>,
}

use anchor_lang::prelude::*;

/// Escrow Record - custody arrangement between one buyer and one retailer
#[account]
#[derive(Debug, PartialEq, Eq)]
pub struct EscrowRecord {
    /// Caller-chosen identifier, the only input to the record address
    pub escrow_id: u64,

    /// The buyer who funded the escrow
    pub buyer: Pubkey,

    /// The retailer paid out on release
    pub retailer: Pubkey,

    /// Optional arbiter allowed to settle either way
    pub arbiter: Option<Pubkey>,

    /// Mint of the custody token account
    pub mint: Pubkey,

    /// Token amount locked at creation
    pub amount: u64,

    /// Lifecycle state
    pub state: EscrowState,

    /// Timestamp when escrow was created
    pub created_ts: i64,

    /// Timestamp of the terminal transition (0 while awaiting delivery)
    pub settled_ts: i64,

    /// PDA bump seed
    pub bump: u8,
}

impl EscrowRecord {
    /// Size calculation for account allocation
    /// Discriminator (8) + u64 (8) + Pubkey (32) + Pubkey (32)
    /// + Option<Pubkey> (1 + 32) + Pubkey (32) + u64 (8)
    /// + EscrowState (1) + i64 (8) + i64 (8) + u8 (1)
    pub const LEN: usize = 8 + 8 + 32 + 32 + 33 + 32 + 8 + 1 + 8 + 8 + 1;

    /// PDA seed prefix
    pub const SEED_PREFIX: &'static [u8] = b"escrow";

    pub fn is_awaiting_delivery(&self) -> bool {
        self.state == EscrowState::AwaitingDelivery
    }

    /// Whether `key` may move the escrow into the `Released` state.
    ///
    /// The buyer releases by confirming delivery; the arbiter, when one was
    /// named at creation, may release on the buyer's behalf.
    pub fn may_release(&self, key: &Pubkey) -> bool {
        *key == self.buyer || self.is_arbiter(key)
    }

    /// Whether `key` may move the escrow into the `Refunded` state.
    ///
    /// The retailer refunds by giving up the payment; the arbiter may
    /// refund on a dispute.
    pub fn may_refund(&self, key: &Pubkey) -> bool {
        *key == self.retailer || self.is_arbiter(key)
    }

    fn is_arbiter(&self, key: &Pubkey) -> bool {
        self.arbiter.as_ref() == Some(key)
    }
}

/// Escrow state enum
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EscrowState {
    /// Funds locked in custody, waiting for delivery
    AwaitingDelivery,
    /// Custody paid out to the retailer
    Released,
    /// Custody returned to the buyer
    Refunded,
}

//! Collaborators that call back into the engine mid-transfer.
//!
//! Every nested call must fail with `Reentrant` and leave no trace, and the
//! outer call must still complete with balanced accounting.

use chrono::{DateTime, Duration, Utc};
use sealbid_engine::{AssetCustody, AuctionEngine, PaymentRail, TransferError};
use sealbid_types::{
    AccountId, Amount, AuctionConfig, AuctionError, Commitment, CommitmentWidth, PricingRule,
    Salt,
};

/// Which entry point the hostile collaborator tries from inside a callback.
#[derive(Clone, Copy, Debug)]
enum Attack {
    EndAuction,
    Withdraw(AccountId),
    WithdrawProceeds,
    Commit,
    Reveal(AccountId),
}

struct HostileRail {
    attack: Attack,
    now: DateTime<Utc>,
    attempts: Vec<AuctionError>,
    received: Amount,
}

impl HostileRail {
    fn new(attack: Attack, now: DateTime<Utc>) -> Self {
        Self {
            attack,
            now,
            attempts: Vec::new(),
            received: 0,
        }
    }

    fn strike(&mut self, engine: &mut AuctionEngine) {
        let mut inner = OkRail;
        let result = match self.attack {
            Attack::EndAuction => engine
                .end_auction(self.now, &mut NoopCustody, &mut inner)
                .map(|_| ()),
            Attack::Withdraw(account) => {
                engine.withdraw_collateral(account, &mut inner).map(|_| ())
            }
            Attack::WithdrawProceeds => engine.withdraw_proceeds(&mut inner).map(|_| ()),
            Attack::Commit => {
                let (_, c) = Commitment::sealed(1, CommitmentWidth::Truncated160);
                let start = engine.config().start_time;
                engine.commit(AccountId::new(), c, 1, start)
            }
            Attack::Reveal(account) => engine
                .reveal(account, &Salt::random(), 1, self.now, &mut inner)
                .map(|_| ()),
        };
        if let Err(err) = result {
            self.attempts.push(err);
        }
    }
}

impl PaymentRail for HostileRail {
    fn transfer(
        &mut self,
        engine: &mut AuctionEngine,
        _to: AccountId,
        amount: Amount,
    ) -> Result<(), TransferError> {
        assert!(engine.is_locked(), "guard must be held across transfers");
        self.strike(engine);
        self.received += amount;
        Ok(())
    }
}

struct OkRail;

impl PaymentRail for OkRail {
    fn transfer(
        &mut self,
        _engine: &mut AuctionEngine,
        _to: AccountId,
        _amount: Amount,
    ) -> Result<(), TransferError> {
        Ok(())
    }
}

struct NoopCustody;

impl AssetCustody for NoopCustody {
    fn transfer_asset_to_winner(&mut self, _engine: &mut AuctionEngine, _winner: AccountId) {}
    fn return_asset_to_seller(&mut self, _engine: &mut AuctionEngine, _seller: AccountId) {}
}

/// Custody that tries to settle the auction a second time.
struct HostileCustody {
    now: DateTime<Utc>,
    attempts: Vec<AuctionError>,
}

impl AssetCustody for HostileCustody {
    fn transfer_asset_to_winner(&mut self, engine: &mut AuctionEngine, _winner: AccountId) {
        let mut rail = OkRail;
        if let Err(err) = engine.end_auction(self.now, &mut NoopCustody, &mut rail) {
            self.attempts.push(err);
        }
    }

    fn return_asset_to_seller(&mut self, engine: &mut AuctionEngine, seller: AccountId) {
        self.transfer_asset_to_winner(engine, seller);
    }
}

struct Fixture {
    engine: AuctionEngine,
    reveal_at: DateTime<Utc>,
}

fn fixture(pricing: PricingRule) -> Fixture {
    let config = AuctionConfig::new(
        AccountId::new(),
        DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        Duration::minutes(10),
        Duration::minutes(10),
    )
    .with_pricing(pricing);
    let reveal_at = config.commit_deadline + Duration::seconds(1);
    Fixture {
        engine: AuctionEngine::new(config).unwrap(),
        reveal_at,
    }
}

fn commit(engine: &mut AuctionEngine, amount: Amount, deposit: Amount) -> (AccountId, Salt) {
    let account = AccountId::new();
    let (salt, c) = Commitment::sealed(amount, engine.config().commitment_width);
    let start = engine.config().start_time;
    engine.commit(account, c, deposit, start).unwrap();
    (account, salt)
}

fn all_reentrant(attempts: &[AuctionError]) -> bool {
    !attempts.is_empty() && attempts.iter().all(|e| matches!(e, AuctionError::Reentrant))
}

#[test]
fn refund_callback_cannot_settle() {
    let mut f = fixture(PricingRule::FirstPrice);
    let (x, sx) = commit(&mut f.engine, 100, 100);
    let (y, sy) = commit(&mut f.engine, 50, 80);

    let mut rail = HostileRail::new(Attack::EndAuction, f.reveal_at);
    f.engine.reveal(x, &sx, 100, f.reveal_at, &mut rail).unwrap();
    f.engine.reveal(y, &sy, 50, f.reveal_at, &mut rail).unwrap();

    assert!(all_reentrant(&rail.attempts));
    assert_eq!(rail.received, 80);
    assert!(!f.engine.is_finalized());
    assert!(!f.engine.is_locked());
    f.engine.verify_accounting().unwrap();
}

#[test]
fn refund_callback_cannot_reveal() {
    let mut f = fixture(PricingRule::SecondPrice);
    let (x, sx) = commit(&mut f.engine, 100, 100);
    let (y, sy) = commit(&mut f.engine, 50, 80);
    let (z, _) = commit(&mut f.engine, 1, 1);

    let mut rail = HostileRail::new(Attack::Reveal(z), f.reveal_at);
    f.engine.reveal(x, &sx, 100, f.reveal_at, &mut rail).unwrap();
    f.engine.reveal(y, &sy, 50, f.reveal_at, &mut rail).unwrap();

    assert!(all_reentrant(&rail.attempts));
    assert_eq!(f.engine.num_unrevealed_bids(), 1);
    assert!(f.engine.bid(z).is_unrevealed());
    f.engine.verify_accounting().unwrap();
}

#[test]
fn refund_callback_cannot_commit() {
    let mut f = fixture(PricingRule::FirstPrice);
    let (x, sx) = commit(&mut f.engine, 100, 100);
    let (y, sy) = commit(&mut f.engine, 50, 80);

    let mut rail = HostileRail::new(Attack::Commit, f.reveal_at);
    f.engine.reveal(x, &sx, 100, f.reveal_at, &mut rail).unwrap();
    f.engine.reveal(y, &sy, 50, f.reveal_at, &mut rail).unwrap();

    assert!(all_reentrant(&rail.attempts));
    assert_eq!(f.engine.ledger().len(), 2);
    assert_eq!(f.engine.accounting().total_deposited(), 180);
    f.engine.verify_accounting().unwrap();
}

#[test]
fn excess_refund_callback_cannot_withdraw_again() {
    let mut f = fixture(PricingRule::SecondPrice);
    let (x, sx) = commit(&mut f.engine, 100, 150);
    let (y, sy) = commit(&mut f.engine, 60, 60);
    let mut plain = HostileRail::new(Attack::Commit, f.reveal_at);
    f.engine.reveal(y, &sy, 60, f.reveal_at, &mut plain).unwrap();
    f.engine.reveal(x, &sx, 100, f.reveal_at, &mut plain).unwrap();

    let mut rail = HostileRail::new(Attack::Withdraw(y), f.reveal_at);
    let settlement = f
        .engine
        .end_auction(f.reveal_at, &mut NoopCustody, &mut rail)
        .unwrap();
    assert_eq!(settlement.final_price, 60);
    assert!(all_reentrant(&rail.attempts));
    assert_eq!(f.engine.bid(y).collateral, 60);

    let mut rail = HostileRail::new(Attack::Withdraw(y), f.reveal_at);
    f.engine.withdraw_collateral(y, &mut rail).unwrap();
    assert!(all_reentrant(&rail.attempts));
    assert_eq!(rail.received, 60);
    assert_eq!(f.engine.bid(y).collateral, 0);
    f.engine.verify_accounting().unwrap();
}

#[test]
fn seller_callback_cannot_pull_proceeds() {
    let mut f = fixture(PricingRule::FirstPrice);
    let (x, sx) = commit(&mut f.engine, 40, 40);
    let mut rail = HostileRail::new(Attack::WithdrawProceeds, f.reveal_at);
    f.engine.reveal(x, &sx, 40, f.reveal_at, &mut rail).unwrap();

    f.engine
        .end_auction(f.reveal_at, &mut NoopCustody, &mut rail)
        .unwrap();
    assert!(all_reentrant(&rail.attempts));
    assert_eq!(rail.received, 40);
    assert_eq!(f.engine.seller_proceeds(), 0);
    f.engine.verify_accounting().unwrap();
}

#[test]
fn custody_callback_cannot_settle_twice() {
    let mut f = fixture(PricingRule::FirstPrice);
    let (x, sx) = commit(&mut f.engine, 40, 70);
    let mut rail = HostileRail::new(Attack::Commit, f.reveal_at);
    f.engine.reveal(x, &sx, 40, f.reveal_at, &mut rail).unwrap();

    let mut custody = HostileCustody {
        now: f.reveal_at,
        attempts: Vec::new(),
    };
    let mut rail = HostileRail::new(Attack::EndAuction, f.reveal_at);
    let settlement = f
        .engine
        .end_auction(f.reveal_at, &mut custody, &mut rail)
        .unwrap();

    assert_eq!(settlement.winner, Some(x));
    assert!(all_reentrant(&custody.attempts));
    assert!(all_reentrant(&rail.attempts));
    assert_eq!(rail.received, 70);
    assert!(f.engine.is_finalized());
    assert!(!f.engine.is_locked());

    let mut again = HostileRail::new(Attack::Commit, f.reveal_at);
    assert!(matches!(
        f.engine.end_auction(f.reveal_at, &mut NoopCustody, &mut again),
        Err(AuctionError::AlreadyFinalized)
    ));
    f.engine.verify_accounting().unwrap();
}

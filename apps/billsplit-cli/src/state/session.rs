//! # Session State
//!
//! The bill being worked on plus the discount the user last asked for.
//!
//! ## Totals Cache
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  totals()                                                               │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  cached (revision, discount) == (bill.revision(), self.discount)?       │
//! │     │ yes                          │ no                                 │
//! │     ▼                              ▼                                    │
//! │  clone cached Totals          bill.calculate(discount) ──► store       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Every bill mutation bumps the revision, so the cache never goes stale.

use std::sync::{Arc, Mutex, PoisonError};

use billsplit_core::validation::validate_discount;
use billsplit_core::{Bill, CoreResult, Totals};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct CachedTotals {
    revision: u64,
    discount: f64,
    totals: Totals,
}

/// One bill and its working discount.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    bill: Bill,
    discount: f64,
    cache: Option<CachedTotals>,
}

impl Session {
    /// Starts a session; `discount` is a fraction in `[0, 1)`.
    pub fn new(bill: Bill, discount: f64) -> CoreResult<Self> {
        validate_discount(discount)?;
        Ok(Session {
            id: Uuid::new_v4(),
            bill,
            discount,
            cache: None,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn bill(&self) -> &Bill {
        &self.bill
    }

    pub fn bill_mut(&mut self) -> &mut Bill {
        &mut self.bill
    }

    pub fn discount(&self) -> f64 {
        self.discount
    }

    pub fn set_discount(&mut self, discount: f64) -> CoreResult<()> {
        validate_discount(discount)?;
        self.discount = discount;
        Ok(())
    }

    /// Totals at the working discount, recomputed only when stale.
    pub fn totals(&mut self) -> CoreResult<Totals> {
        let revision = self.bill.revision();
        if let Some(cached) = &self.cache {
            if cached.revision == revision && cached.discount == self.discount {
                return Ok(cached.totals.clone());
            }
        }

        let totals = self.bill.calculate(self.discount)?;
        debug!(session = %self.id, revision, discount = self.discount, "Totals recalculated");
        self.cache = Some(CachedTotals {
            revision,
            discount: self.discount,
            totals: totals.clone(),
        });
        Ok(totals)
    }

    /// Whether the next `totals()` call would hit the cache.
    pub fn totals_cached(&self) -> bool {
        self.cache.as_ref().map_or(false, |cached| {
            cached.revision == self.bill.revision() && cached.discount == self.discount
        })
    }
}

/// Shared handle to the session.
///
/// ## Thread Safety
/// `Arc<Mutex<Session>>`; every access goes through a closure so the lock is
/// never held across a caller's own code. A poisoned lock is recovered, since
/// a panic mid-command leaves the bill in a state it already validated.
#[derive(Debug, Clone)]
pub struct BillState {
    session: Arc<Mutex<Session>>,
}

impl BillState {
    pub fn new(session: Session) -> Self {
        BillState {
            session: Arc::new(Mutex::new(session)),
        }
    }

    /// Executes a function with read access to the session.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let count = state.with_session(|s| s.bill().items().len());
    /// ```
    pub fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Session) -> R,
    {
        let session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        f(&session)
    }

    /// Executes a function with write access to the session.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// state.with_session_mut(|s| s.bill_mut().add_participant("Alice"))?;
    /// ```
    pub fn with_session_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut session)
    }

    /// Shorthand for read access to the bill alone.
    pub fn with_bill<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Bill) -> R,
    {
        self.with_session(|s| f(s.bill()))
    }

    /// Shorthand for write access to the bill alone.
    pub fn with_bill_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Bill) -> R,
    {
        self.with_session_mut(|s| f(s.bill_mut()))
    }

    pub fn totals(&self) -> CoreResult<Totals> {
        self.with_session_mut(Session::totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billsplit_core::{CoreError, ItemDraft, Money};

    fn session() -> Session {
        let mut bill = Bill::new();
        bill.add_participant("Alice").unwrap();
        bill.add_participant("Bob").unwrap();
        bill.add_item(ItemDraft::new("Pizza", Money::from_cents(1200), 1).with_participants(["Alice", "Bob"]))
            .unwrap();
        Session::new(bill, 0.0).unwrap()
    }

    #[test]
    fn test_rejects_bad_discount() {
        assert!(matches!(
            Session::new(Bill::new(), 1.5),
            Err(CoreError::Validation(_))
        ));
        let mut s = session();
        assert!(s.set_discount(-0.1).is_err());
        assert_eq!(s.discount(), 0.0);
    }

    #[test]
    fn test_totals_cache_follows_revision() {
        let mut s = session();
        assert!(!s.totals_cached());

        let first = s.totals().unwrap();
        assert!(s.totals_cached());
        assert_eq!(first.by_name("Alice").unwrap().total_owed, 6.0);

        s.bill_mut().remove_participant("Bob").unwrap();
        assert!(!s.totals_cached());
        let second = s.totals().unwrap();
        assert_eq!(second.by_name("Alice").unwrap().total_owed, 6.0);
        assert_eq!(second.participants.len(), 1);
    }

    #[test]
    fn test_totals_cache_follows_discount() {
        let mut s = session();
        s.totals().unwrap();
        s.set_discount(0.5).unwrap();
        assert!(!s.totals_cached());
    }

    #[test]
    fn test_state_closures() {
        let state = BillState::new(session());
        state.with_bill_mut(|b| b.add_participant("Carol")).unwrap();
        assert_eq!(state.with_bill(|b| b.participants().len()), 3);

        let totals = state.totals().unwrap();
        assert_eq!(totals.participants.len(), 3);

        let clone = state.clone();
        assert_eq!(clone.with_session(|s| s.id()), state.with_session(|s| s.id()));
    }
}

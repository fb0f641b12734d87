use hourglass_rs::SafeTimeProvider;
use serde::Serialize;
use uuid::Uuid;

use crate::config::CoopConfig;
use crate::decimal::Money;
use crate::errors::{CoopError, Result};
use crate::events::{Event, EventStore};
use crate::members::{classify, Member, MemberUpdate, NewMember, PaymentCapacity};
use crate::store::Store;
use crate::types::{CreditRating, MemberId};

/// root orchestrator for the cooperative
///
/// Owns the record store, the configuration, and the event log. Every
/// business operation takes `&mut self` and an explicit time provider, so
/// each call is one exclusive pass over consistent records: the capacity
/// and duplicate checks run against the same state the mutation commits
/// into.
pub struct Cooperative {
    pub config: CoopConfig,
    pub(crate) store: Store,
    pub events: EventStore,
}

impl Cooperative {
    /// cooperative with default settings
    pub fn new() -> Self {
        Self {
            config: CoopConfig::default(),
            store: Store::new(),
            events: EventStore::new(),
        }
    }

    /// cooperative with validated custom settings
    pub fn with_config(config: CoopConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store: Store::new(),
            events: EventStore::new(),
        })
    }

    /// drain events collected since the last call
    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    /// enroll a member; national id must be unique
    pub fn enroll_member(&mut self, new: NewMember, time: &SafeTimeProvider) -> Result<Member> {
        new.validate()?;

        if self.store.member_by_dni(&new.dni).is_some() {
            return Err(CoopError::DuplicateDni { dni: new.dni });
        }

        let member = Member {
            id: Uuid::new_v4(),
            name: new.name,
            dni: new.dni,
            shares: new.shares,
            guarantee: new.guarantee,
            credit_score: new.credit_score,
            credit_rating: classify(new.credit_score),
            phone: new.phone,
            email: new.email,
            address: new.address,
            is_active: true,
            enrolled_at: time.now(),
        };

        self.events.emit(Event::MemberEnrolled {
            member_id: member.id,
            dni: member.dni.clone(),
            rating: member.credit_rating,
            timestamp: time.now(),
        });

        self.store.insert_member(member.clone());
        Ok(member)
    }

    /// fetch a member record
    pub fn member(&self, id: MemberId) -> Result<&Member> {
        self.store.member(id).ok_or(CoopError::MemberNotFound { id })
    }

    /// look a member up by national id
    pub fn member_by_dni(&self, dni: &str) -> Option<&Member> {
        self.store.member_by_dni(dni)
    }

    /// apply a partial update
    ///
    /// A score change re-runs the classifier and persists the new rating
    /// in the same write, so the stored rating never diverges from the
    /// stored score.
    pub fn update_member(
        &mut self,
        id: MemberId,
        update: MemberUpdate,
        time: &SafeTimeProvider,
    ) -> Result<Member> {
        update.validate()?;

        if let Some(dni) = &update.dni {
            if let Some(existing) = self.store.member_by_dni(dni) {
                if existing.id != id {
                    return Err(CoopError::DuplicateDni { dni: dni.clone() });
                }
            }
        }

        let member = self
            .store
            .member_mut(id)
            .ok_or(CoopError::MemberNotFound { id })?;
        let old_rating = member.credit_rating;

        if let Some(name) = update.name {
            member.name = name;
        }
        if let Some(dni) = update.dni {
            member.dni = dni;
        }
        if let Some(shares) = update.shares {
            member.shares = shares;
        }
        if let Some(guarantee) = update.guarantee {
            member.guarantee = guarantee;
        }
        if let Some(phone) = update.phone {
            member.phone = Some(phone);
        }
        if let Some(email) = update.email {
            member.email = Some(email);
        }
        if let Some(address) = update.address {
            member.address = Some(address);
        }
        if let Some(score) = update.credit_score {
            member.credit_score = score;
            member.credit_rating = classify(score);
        }

        let snapshot = member.clone();
        if snapshot.credit_rating != old_rating {
            self.events.emit(Event::CreditRatingChanged {
                member_id: id,
                old_rating,
                new_rating: snapshot.credit_rating,
                score: snapshot.credit_score,
                timestamp: time.now(),
            });
        }

        Ok(snapshot)
    }

    /// soft-delete; refused while the member holds live loans
    pub fn deactivate_member(&mut self, id: MemberId, time: &SafeTimeProvider) -> Result<Member> {
        self.member(id)?;
        if self.store.has_live_loans(id) {
            return Err(CoopError::MemberHasActiveLoans { id });
        }

        let member = self
            .store
            .member_mut(id)
            .ok_or(CoopError::MemberNotFound { id })?;
        member.is_active = false;
        let snapshot = member.clone();

        self.events.emit(Event::MemberDeactivated {
            member_id: id,
            timestamp: time.now(),
        });

        Ok(snapshot)
    }

    /// a member's borrowing capacity against their live debt
    pub fn member_capacity(&self, id: MemberId) -> Result<PaymentCapacity> {
        let member = self.member(id)?;
        Ok(self.capacity_of(member))
    }

    pub(crate) fn capacity_of(&self, member: &Member) -> PaymentCapacity {
        PaymentCapacity::assess(
            member.shares,
            member.guarantee,
            self.store.outstanding_debt(member.id),
            &self.config,
        )
    }

    /// roll-up across active members
    pub fn member_statistics(&self) -> MemberStatistics {
        let active = || self.store.members().filter(|m| m.is_active);

        let by_rating = [CreditRating::Green, CreditRating::Yellow, CreditRating::Red]
            .into_iter()
            .map(|rating| RatingBreakdown {
                rating,
                count: active().filter(|m| m.credit_rating == rating).count(),
            })
            .collect();

        let active_count = active().count();
        let score_sum: u32 = active().map(|m| m.credit_score as u32).sum();

        MemberStatistics {
            active_members: active_count,
            by_rating,
            total_shares: active().map(|m| m.shares as u64).sum(),
            total_guarantee: active().map(|m| m.guarantee).sum(),
            average_credit_score: if active_count == 0 {
                0
            } else {
                score_sum / active_count as u32
            },
        }
    }
}

impl Default for Cooperative {
    fn default() -> Self {
        Self::new()
    }
}

/// registry roll-up
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberStatistics {
    pub active_members: usize,
    pub by_rating: Vec<RatingBreakdown>,
    pub total_shares: u64,
    pub total_guarantee: Money,
    pub average_credit_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingBreakdown {
    pub rating: CreditRating,
    pub count: usize,
}

//! Player-to-player trades of cash and unimproved properties.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::board::SpaceId;
use super::events::GameEvent;
use super::state::{require_active, GameState};
use super::{Money, PlayerId};
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind, RuleKind};

pub type OfferId = u32;

/// One side of a trade.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TradeTerms {
    pub cash: Money,
    pub properties: BTreeSet<SpaceId>,
}

impl TradeTerms {
    pub fn is_empty(&self) -> bool {
        self.cash == 0 && self.properties.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeOffer {
    pub id: OfferId,
    pub proposer: PlayerId,
    pub responder: PlayerId,
    /// What the proposer gives.
    pub offered: TradeTerms,
    /// What the proposer asks for in return.
    pub requested: TradeTerms,
    pub status: OfferStatus,
}

/// Open offers. Settled offers are only reported through events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradeBook {
    next_id: OfferId,
    pending: BTreeMap<OfferId, TradeOffer>,
}

impl TradeBook {
    pub fn pending(&self) -> impl Iterator<Item = &TradeOffer> {
        self.pending.values()
    }

    pub fn get(&self, id: OfferId) -> Option<&TradeOffer> {
        self.pending.get(&id)
    }

    fn insert(&mut self, mut offer: TradeOffer) -> TradeOffer {
        self.next_id += 1;
        offer.id = self.next_id;
        self.pending.insert(offer.id, offer.clone());
        offer
    }

    fn close(&mut self, id: OfferId, status: OfferStatus, events: &mut Vec<GameEvent>) {
        if let Some(mut offer) = self.pending.remove(&id) {
            offer.status = status;
            events.push(GameEvent::TradeUpdated { offer });
        }
    }

    /// Expire every open offer `player` is party to.
    pub fn expire_involving(&mut self, player: PlayerId, events: &mut Vec<GameEvent>) {
        let ids: Vec<OfferId> = self
            .pending
            .values()
            .filter(|o| o.proposer == player || o.responder == player)
            .map(|o| o.id)
            .collect();
        for id in ids {
            self.close(id, OfferStatus::Expired, events);
        }
    }

    pub fn expire_all(&mut self, events: &mut Vec<GameEvent>) {
        let ids: Vec<OfferId> = self.pending.keys().copied().collect();
        for id in ids {
            self.close(id, OfferStatus::Expired, events);
        }
    }
}

pub fn propose_trade(
    state: &mut GameState,
    proposer: PlayerId,
    responder: PlayerId,
    offered: TradeTerms,
    requested: TradeTerms,
    events: &mut Vec<GameEvent>,
) -> Result<OfferId, DomainError> {
    require_active(state, proposer)?;
    if proposer == responder {
        return Err(invalid("cannot trade with yourself"));
    }
    if state.ledger.player(responder)?.bankrupt {
        return Err(invalid(format!("seat {responder} is bankrupt")));
    }
    if offered.is_empty() && requested.is_empty() {
        return Err(invalid("an offer must move something"));
    }
    if offered.cash < 0 || requested.cash < 0 {
        return Err(invalid("cash amounts cannot be negative"));
    }
    check_side(state, proposer, &offered)?;
    check_side(state, responder, &requested)?;

    // One open offer per ordered pair; a new one replaces the old.
    let stale: Vec<OfferId> = state
        .trades
        .pending()
        .filter(|o| o.proposer == proposer && o.responder == responder)
        .map(|o| o.id)
        .collect();
    for id in stale {
        state.trades.close(id, OfferStatus::Withdrawn, events);
    }

    let offer = state.trades.insert(TradeOffer {
        id: 0,
        proposer,
        responder,
        offered,
        requested,
        status: OfferStatus::Pending,
    });
    let id = offer.id;
    events.push(GameEvent::TradeUpdated { offer });
    Ok(id)
}

pub fn respond_trade(
    state: &mut GameState,
    who: PlayerId,
    offer_id: OfferId,
    accept: bool,
    events: &mut Vec<GameEvent>,
) -> Result<(), DomainError> {
    require_active(state, who)?;
    let offer = require_offer(state, offer_id)?.clone();
    if offer.responder != who {
        return Err(invalid(format!("offer {offer_id} is not addressed to seat {who}")));
    }
    if !accept {
        state.trades.close(offer_id, OfferStatus::Rejected, events);
        return Ok(());
    }

    if check_side(state, offer.proposer, &offer.offered).is_err()
        || check_side(state, offer.responder, &offer.requested).is_err()
    {
        return Err(DomainError::conflict(
            ConflictKind::StaleOffer,
            format!("offer {offer_id} no longer matches what the players hold"),
        ));
    }
    let board = state.board;
    for space in offer.offered.properties.iter().chain(&offer.requested.properties) {
        if state.registry.group_has_buildings(board, *space)? {
            return Err(DomainError::rule(
                RuleKind::EncumberedProperty,
                format!("space {space} has buildings in its group"),
            ));
        }
    }

    state
        .ledger
        .transfer(offer.proposer, offer.responder, offer.offered.cash)?;
    state
        .ledger
        .transfer(offer.responder, offer.proposer, offer.requested.cash)?;
    for space in &offer.offered.properties {
        state.registry.transfer(&mut state.ledger, *space, offer.responder)?;
    }
    for space in &offer.requested.properties {
        state.registry.transfer(&mut state.ledger, *space, offer.proposer)?;
    }
    tracing::debug!(offer_id, proposer = offer.proposer, responder = offer.responder, "trade accepted");
    state.trades.close(offer_id, OfferStatus::Accepted, events);
    Ok(())
}

pub fn withdraw_trade(
    state: &mut GameState,
    who: PlayerId,
    offer_id: OfferId,
    events: &mut Vec<GameEvent>,
) -> Result<(), DomainError> {
    require_active(state, who)?;
    let offer = require_offer(state, offer_id)?;
    if offer.proposer != who {
        return Err(invalid(format!("seat {who} did not propose offer {offer_id}")));
    }
    state.trades.close(offer_id, OfferStatus::Withdrawn, events);
    Ok(())
}

fn require_offer(state: &GameState, offer_id: OfferId) -> Result<&TradeOffer, DomainError> {
    state
        .trades
        .get(offer_id)
        .ok_or_else(|| DomainError::not_found(NotFoundKind::Offer, format!("no open offer {offer_id}")))
}

/// `player` holds the cash and owns every property on their side.
fn check_side(state: &GameState, player: PlayerId, terms: &TradeTerms) -> Result<(), DomainError> {
    let holder = state.ledger.player(player)?;
    if holder.cash < terms.cash {
        return Err(invalid(format!("seat {player} does not hold {}", terms.cash)));
    }
    for space in &terms.properties {
        if state.registry.owner_of(*space) != Some(player) {
            return Err(invalid(format!("seat {player} does not own space {space}")));
        }
    }
    Ok(())
}

fn invalid(detail: impl Into<String>) -> DomainError {
    DomainError::rule(RuleKind::InvalidOffer, detail)
}

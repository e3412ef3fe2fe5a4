//! Round lifecycle: whose turn it is and when the round ends.

use worms_core::{ActionError, ActorId, RoundPhase, TeamId, Winner};

use crate::actors::Actor;

#[derive(Clone, Debug)]
pub(crate) struct TurnEngine {
    phase: RoundPhase,
    current: Option<ActorId>,
    winner: Option<Winner>,
}

impl TurnEngine {
    pub(crate) const fn new() -> Self {
        Self {
            phase: RoundPhase::AwaitingStart,
            current: None,
            winner: None,
        }
    }

    pub(crate) const fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub(crate) const fn current(&self) -> Option<ActorId> {
        self.current
    }

    pub(crate) const fn winner(&self) -> Option<Winner> {
        self.winner
    }

    /// Fails unless actors and teams may still be registered.
    pub(crate) fn ensure_setup(&self) -> Result<(), ActionError> {
        match self.phase {
            RoundPhase::AwaitingStart => Ok(()),
            RoundPhase::TurnInProgress => Err(ActionError::RoundAlreadyStarted),
            RoundPhase::RoundOver => Err(ActionError::RoundOver),
        }
    }

    /// Fails unless some actor holds the turn.
    pub(crate) fn ensure_in_progress(&self) -> Result<(), ActionError> {
        match self.phase {
            RoundPhase::AwaitingStart => Err(ActionError::RoundNotStarted),
            RoundPhase::TurnInProgress => Ok(()),
            RoundPhase::RoundOver => Err(ActionError::RoundOver),
        }
    }

    pub(crate) fn start(&mut self) {
        self.phase = RoundPhase::TurnInProgress;
    }

    pub(crate) fn hand_over(&mut self, actor: ActorId) {
        self.current = Some(actor);
    }

    pub(crate) fn finish(&mut self, winner: Option<Winner>) {
        self.phase = RoundPhase::RoundOver;
        self.current = None;
        self.winner = winner;
    }
}

/// Actor that receives the turn after `after`, wrapping around.
///
/// Actors are kept in ascending id order, so the successor of an actor that
/// already left the round is still well defined.
pub(crate) fn next_actor(actors: &[Actor], after: Option<ActorId>) -> Option<ActorId> {
    let first = actors.first().map(|actor| actor.id);
    let Some(after) = after else {
        return first;
    };
    actors
        .iter()
        .map(|actor| actor.id)
        .find(|id| *id > after)
        .or(first)
}

/// Decides whether the living actors end the round.
///
/// Returns `None` while the round continues, otherwise the winner, which is
/// itself absent when nobody survived.
pub(crate) fn check_victory(
    members: impl IntoIterator<Item = (ActorId, Option<TeamId>)>,
) -> Option<Option<Winner>> {
    let mut members = members.into_iter();
    let Some((first, first_team)) = members.next() else {
        return Some(None);
    };

    let mut solo = true;
    for (_, team) in members {
        solo = false;
        if team.is_none() || team != first_team {
            return None;
        }
    }

    match (solo, first_team) {
        (true, None) => Some(Some(Winner::Actor(first))),
        (_, Some(team)) => Some(Some(Winner::Team(team))),
        (false, None) => None,
    }
}

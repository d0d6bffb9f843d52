//! Progressive fold over a chronological match sequence
//!
//! Every feature family is a reducer: it emits a feature for a match from the
//! state built by earlier matches, then absorbs the match into a new state.
//! `step` is the only place the two are sequenced.

use crate::{FootyError, MatchRecord, Result};

/// A progressive feature computed as a left fold over matches
pub trait Reducer {
    type State: Default;
    type Emit;

    /// Feature for `record` given the state of all earlier matches
    fn emit(&self, state: &Self::State, record: &MatchRecord) -> Self::Emit;

    /// State after `record` has been played
    fn absorb(&self, state: Self::State, record: &MatchRecord) -> Self::State;
}

/// One fold step: emit from the previous state, then absorb the match
pub fn step<R: Reducer>(reducer: &R, state: R::State, record: &MatchRecord) -> (R::State, R::Emit) {
    let emitted = reducer.emit(&state, record);
    let next = reducer.absorb(state, record);
    (next, emitted)
}

/// Fold a reducer over a validated match sequence, one emission per match
pub fn fold<R: Reducer>(reducer: &R, matches: &[MatchRecord]) -> Result<Vec<R::Emit>> {
    validate_chronological(matches)?;
    Ok(fold_unchecked(reducer, matches).1)
}

/// Fold without re-validating order; also returns the final state
pub(crate) fn fold_unchecked<R: Reducer>(
    reducer: &R,
    matches: &[MatchRecord],
) -> (R::State, Vec<R::Emit>) {
    let mut state = R::State::default();
    let mut emitted = Vec::with_capacity(matches.len());
    for record in matches {
        let (next, value) = step(reducer, state, record);
        state = next;
        emitted.push(value);
    }
    (state, emitted)
}

/// Fold and keep the state after every match alongside its emission
pub fn snapshots<R>(reducer: &R, matches: &[MatchRecord]) -> Result<Vec<(R::Emit, R::State)>>
where
    R: Reducer,
    R::State: Clone,
{
    validate_chronological(matches)?;
    let mut state = R::State::default();
    let mut out = Vec::with_capacity(matches.len());
    for record in matches {
        let (next, value) = step(reducer, state, record);
        out.push((value, next.clone()));
        state = next;
    }
    Ok(out)
}

/// Check that rounds never decrease. Equal rounds keep their input order.
pub fn validate_chronological(matches: &[MatchRecord]) -> Result<()> {
    for (index, pair) in matches.windows(2).enumerate() {
        if pair[1].round < pair[0].round {
            return Err(FootyError::Unsorted {
                index: index + 1,
                previous: pair[0].round,
                current: pair[1].round,
            });
        }
    }
    Ok(())
}

//! Fixed-point query resolution over many data sources
//!
//! A query is normalized to DNF and each clause is resolved independently:
//!
//! 1. Every armed source is called with the undecided part of the clause and
//!    a snapshot of the working set taken at the start of the round.
//! 2. Applied results are merged in declaration order (first write wins),
//!    then every field an applied source declares but did not return is
//!    recorded as missing on the identities that source saw.
//! 3. Entities for which some decided term is not true are rejected for the
//!    rest of the clause.
//! 4. A source that applied retires until identities it has not seen join
//!    the working set; a source that did not apply stays armed.
//!
//! The loop stops on a round without new information, when no source is
//! armed, or after `max_rounds`. Clause results are unioned, then a
//! populate-only pass fills the requested fields before projection.

use crate::cancel::CancellationToken;
use crate::config::ResolverConfig;
use crate::error::{ResolveError, ResolveResult};
use crate::source::{DataSource, Retrieval, SourceRef};
use fedq_expr::{Comparison, Resolution, to_dnf};
use fedq_types::{Entities, Entity, EntityId, Value};
use futures::future::join_all;
use indexmap::map::Entry;
use log::{debug, trace, warn};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Resolves queries against a fixed list of data sources.
///
/// A resolver holds no per-query state; concurrent `process_query` calls
/// do not interfere.
#[derive(Clone)]
pub struct Resolver<Id: EntityId> {
    sources: Vec<SourceRef<Id>>,
    config: ResolverConfig,
}

impl<Id: EntityId> Resolver<Id> {
    pub fn new(sources: Vec<SourceRef<Id>>, config: ResolverConfig) -> Self {
        Self { sources, config }
    }

    pub fn builder() -> ResolverBuilder<Id> {
        ResolverBuilder::new()
    }

    pub fn sources(&self) -> &[SourceRef<Id>] {
        &self.sources
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Whether any source can produce `field`
    pub fn declares(&self, field: &str) -> bool {
        self.sources.iter().any(|source| source.declares(field))
    }

    /// Find the entities satisfying `query` and project them onto `fields`
    pub async fn process_query<S: AsRef<str>>(
        &self,
        query: &Comparison,
        fields: &[S],
    ) -> ResolveResult<QueryResult<Id>> {
        self.process_query_with_cancel(query, fields, &CancellationToken::new())
            .await
    }

    /// Like [`process_query`](Self::process_query), aborting with
    /// [`ResolveError::Cancelled`] once `token` fires
    pub async fn process_query_with_cancel<S: AsRef<str>>(
        &self,
        query: &Comparison,
        fields: &[S],
        token: &CancellationToken,
    ) -> ResolveResult<QueryResult<Id>> {
        let run = Run {
            token,
            deadline: self
                .config
                .timeout
                .map(|timeout| (Instant::now() + timeout, timeout)),
        };

        let dnf = to_dnf(query);
        let clause_count = dnf.len();
        debug!("Resolving {} as {} clause(s)", query, clause_count);

        let mut entities = Entities::new();
        let mut fully_solved = true;
        let mut unresolved = Vec::new();
        let mut unsolvable = 0;

        for (index, clause) in dnf.into_iter().enumerate() {
            let outcome = self
                .resolve_clause(&run, clause.terms(), Pass::Filter, Entities::new())
                .await?;
            match outcome.status {
                ClauseStatus::Solved => {
                    debug!("Clause {} solved with {} entities", index, outcome.entities.len());
                }
                ClauseStatus::Partial(remaining) => {
                    warn!("Clause {} stalled with {} undecided term(s)", index, remaining.len());
                    fully_solved = false;
                    extend_unique(&mut unresolved, remaining);
                }
                ClauseStatus::Unsolvable => {
                    debug!("Clause {} is unsolvable", index);
                    unsolvable += 1;
                    continue;
                }
            }
            union_into(&mut entities, outcome.entities);
        }

        if clause_count > 0 && unsolvable == clause_count {
            return Err(ResolveError::Unsolvable);
        }

        let requested: Vec<&str> = fields.iter().map(|field| field.as_ref()).collect();
        let mut targets: Vec<Comparison> = Vec::new();
        let mut undeclared: Vec<Comparison> = Vec::new();
        for field in &requested {
            let target = Comparison::exists(*field);
            if !self.declares(field) {
                warn!("No data source declares requested field '{}'", field);
                extend_unique(&mut undeclared, vec![target]);
            } else if !targets.contains(&target) {
                targets.push(target);
            }
        }

        if !entities.is_empty() && !targets.is_empty() {
            let outcome = self
                .resolve_clause(&run, &targets, Pass::Populate, entities)
                .await?;
            if let ClauseStatus::Partial(remaining) = outcome.status {
                warn!("Could not populate {} requested field(s)", remaining.len());
                fully_solved = false;
                extend_unique(&mut unresolved, remaining);
            }
            entities = outcome.entities;
        }

        if !entities.is_empty() && !undeclared.is_empty() {
            fully_solved = false;
            extend_unique(&mut unresolved, undeclared);
        }

        let entities = entities
            .into_iter()
            .map(|(id, entity)| (id, entity.project(&requested)))
            .collect();

        Ok(QueryResult {
            entities,
            fully_solved,
            unresolved,
        })
    }

    async fn resolve_clause(
        &self,
        run: &Run<'_>,
        terms: &[Comparison],
        pass: Pass,
        entities: Entities<Id>,
    ) -> ResolveResult<ClauseOutcome<Id>> {
        let clause = Comparison::And(terms.to_vec());
        if pass == Pass::Filter && !clause.is_satisfiable_with(&|field: &str| self.declares(field)) {
            debug!("Clause {} needs fields no source declares", clause);
            return Ok(ClauseOutcome {
                entities: Entities::new(),
                status: ClauseStatus::Unsolvable,
            });
        }

        let mut state = ClauseState::new(entities, self.sources.len());
        let mut remaining = pending_terms(terms, &state.entities);
        let mut exhausted = false;
        let mut round = 0;

        loop {
            run.check()?;

            if pass == Pass::Populate && remaining.is_empty() {
                break;
            }
            let armed = state.armed();
            if armed.is_empty() {
                break;
            }
            if round == self.config.max_rounds {
                warn!("Clause {} hit the limit of {} rounds", clause, self.config.max_rounds);
                exhausted = true;
                break;
            }
            round += 1;

            let query = Comparison::And(remaining.clone());
            let snapshot = state.entities.clone();
            let retrievals = self.call_sources(run, &armed, &query, &snapshot).await?;

            let mut progress = state.merge(&self.sources, retrievals, &snapshot, pass);
            if pass == Pass::Filter {
                let rejected = state.reject_refuted(terms)?;
                progress |= rejected > 0;
            }
            state.rearm();
            remaining = pending_terms(terms, &state.entities);

            debug!(
                "Round {}: {} source(s) asked, {} entities, {} undecided term(s)",
                round,
                armed.len(),
                state.entities.len(),
                remaining.len()
            );

            if !progress {
                break;
            }
        }

        let mut accepted = Entities::new();
        let mut pending = false;
        for (id, entity) in state.entities {
            match pass {
                Pass::Filter => match clause.resolve(&entity)? {
                    Resolution::Resolved(value) if value.is_true() => {
                        accepted.insert(id, entity);
                    }
                    Resolution::Resolved(_) => {}
                    Resolution::Unresolvable => pending = true,
                },
                Pass::Populate => {
                    pending |= !terms.iter().all(|term| term.is_resolvable(&entity));
                    accepted.insert(id, entity);
                }
            }
        }

        let status = if exhausted || pending {
            ClauseStatus::Partial(remaining)
        } else if pass == Pass::Filter && !state.admitted && !state.applied {
            ClauseStatus::Unsolvable
        } else {
            ClauseStatus::Solved
        };

        Ok(ClauseOutcome {
            entities: accepted,
            status,
        })
    }

    async fn call_sources(
        &self,
        run: &Run<'_>,
        armed: &[usize],
        query: &Comparison,
        snapshot: &Entities<Id>,
    ) -> ResolveResult<Vec<(usize, Retrieval<Id>)>> {
        if self.config.concurrent_sources {
            let calls = armed.iter().map(|&index| async move {
                let result = self
                    .call_source(run, self.sources[index].as_ref(), query, snapshot)
                    .await;
                result.map(|retrieval| (index, retrieval))
            });
            join_all(calls).await.into_iter().collect()
        } else {
            let mut retrievals = Vec::with_capacity(armed.len());
            for &index in armed {
                let retrieval = self
                    .call_source(run, self.sources[index].as_ref(), query, snapshot)
                    .await?;
                retrievals.push((index, retrieval));
            }
            Ok(retrievals)
        }
    }

    async fn call_source(
        &self,
        run: &Run<'_>,
        source: &dyn DataSource<Id>,
        query: &Comparison,
        snapshot: &Entities<Id>,
    ) -> ResolveResult<Retrieval<Id>> {
        trace!("Asking source '{}' for {}", source.name(), query);
        let call = async {
            tokio::select! {
                biased;
                _ = run.token.cancelled() => Err(ResolveError::Cancelled),
                result = source.retrieve(query, snapshot) => {
                    result.map_err(|error| ResolveError::source_failed(source.name(), error))
                }
            }
        };

        match run.deadline {
            Some((deadline, timeout)) => tokio::time::timeout_at(deadline, call)
                .await
                .map_err(|_| ResolveError::Timeout { timeout })?,
            None => call.await,
        }
    }
}

/// Assembles a [`Resolver`]
pub struct ResolverBuilder<Id: EntityId> {
    sources: Vec<SourceRef<Id>>,
    config: ResolverConfig,
}

impl<Id: EntityId> Default for ResolverBuilder<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: EntityId> ResolverBuilder<Id> {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            config: ResolverConfig::default(),
        }
    }

    pub fn source(self, source: impl DataSource<Id> + 'static) -> Self {
        self.source_ref(Arc::new(source))
    }

    pub fn source_ref(mut self, source: SourceRef<Id>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_rounds(mut self, max_rounds: usize) -> Self {
        self.config.max_rounds = max_rounds;
        self
    }

    pub fn concurrent_sources(mut self, concurrent: bool) -> Self {
        self.config.concurrent_sources = concurrent;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Resolver<Id> {
        Resolver::new(self.sources, self.config)
    }
}

/// Entities satisfying a query, projected onto the requested fields
#[derive(Debug, Clone)]
pub struct QueryResult<Id> {
    pub entities: Entities<Id>,
    /// False when some clause or the projection pass stalled, or a
    /// requested field has no source
    pub fully_solved: bool,
    /// Terms left undecided by stalled clauses, plus `exists` terms for
    /// requested fields no source declares
    pub unresolved: Vec<Comparison>,
}

impl<Id: EntityId> QueryResult<Id> {
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &Id> {
        self.entities.keys()
    }

    pub fn get(&self, id: &Id) -> Option<&Entity<Id>> {
        self.entities.get(id)
    }

    /// The entities, or `PartiallySolvable` carrying the undecided terms
    pub fn into_complete(self) -> ResolveResult<Entities<Id>> {
        if self.fully_solved {
            Ok(self.entities)
        } else {
            Err(ResolveError::partially_solvable(self.unresolved))
        }
    }
}

struct Run<'a> {
    token: &'a CancellationToken,
    deadline: Option<(Instant, Duration)>,
}

impl Run<'_> {
    fn check(&self) -> ResolveResult<()> {
        if self.token.is_cancelled() {
            return Err(ResolveError::Cancelled);
        }
        match self.deadline {
            Some((deadline, timeout)) if Instant::now() >= deadline => Err(ResolveError::Timeout { timeout }),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    /// Resolve a query clause, rejecting refuted entities
    Filter,
    /// Fill fields of known entities only
    Populate,
}

enum ClauseStatus {
    Solved,
    Partial(Vec<Comparison>),
    /// The clause needs a field no source declares, or no identity was ever
    /// admitted and no source ever applied. A clause whose sources applied
    /// but found nothing is `Solved` and empty.
    Unsolvable,
}

struct ClauseOutcome<Id> {
    entities: Entities<Id>,
    status: ClauseStatus,
}

struct SourceSlot<Id> {
    armed: bool,
    seen: HashSet<Id>,
}

struct ClauseState<Id> {
    entities: Entities<Id>,
    rejected: HashSet<Id>,
    slots: Vec<SourceSlot<Id>>,
    /// Whether any identity ever entered the working set
    admitted: bool,
    /// Whether any source ever reported `applied`
    applied: bool,
}

impl<Id: EntityId> ClauseState<Id> {
    fn new(entities: Entities<Id>, sources: usize) -> Self {
        let admitted = !entities.is_empty();
        Self {
            entities,
            rejected: HashSet::new(),
            slots: (0..sources)
                .map(|_| SourceSlot {
                    armed: true,
                    seen: HashSet::new(),
                })
                .collect(),
            admitted,
            applied: false,
        }
    }

    fn armed(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.armed)
            .map(|(index, _)| index)
            .collect()
    }

    /// Merge one round of retrievals; returns whether anything changed
    fn merge(
        &mut self,
        sources: &[SourceRef<Id>],
        retrievals: Vec<(usize, Retrieval<Id>)>,
        snapshot: &Entities<Id>,
        pass: Pass,
    ) -> bool {
        let mut progress = false;
        let mut applied = Vec::new();

        for (index, retrieval) in retrievals {
            let name = sources[index].name();
            if !retrieval.applied {
                trace!("Source '{}' did not apply", name);
                continue;
            }

            self.applied = true;
            let slot = &mut self.slots[index];
            slot.armed = false;
            slot.seen.extend(snapshot.keys().cloned());

            for (id, returned) in retrieval.entities {
                if self.rejected.contains(&id) {
                    continue;
                }
                let entity = match self.entities.entry(id.clone()) {
                    Entry::Occupied(entry) => entry.into_mut(),
                    Entry::Vacant(_) if pass == Pass::Populate => continue,
                    Entry::Vacant(entry) => {
                        trace!("Source '{}' introduced {:?}", name, id);
                        self.admitted = true;
                        progress = true;
                        entry.insert(Entity::new(id.clone()))
                    }
                };
                for (field, value) in returned.fields() {
                    progress |= entity.add_field(field.clone(), value.clone());
                }
                slot.seen.insert(id);
            }
            applied.push(index);
        }

        for index in applied {
            let seen = &self.slots[index].seen;
            for (id, entity) in self.entities.iter_mut().filter(|(id, _)| seen.contains(*id)) {
                for field in sources[index].retrievable_fields() {
                    if entity.add_field(field.clone(), Value::Missing) {
                        trace!("Source '{}' has no {} for {:?}", sources[index].name(), field, id);
                        progress = true;
                    }
                }
            }
        }

        progress
    }

    /// Drop entities for which a decided term is not true. Fields never
    /// change once present, so such an entity can never satisfy the clause.
    fn reject_refuted(&mut self, terms: &[Comparison]) -> ResolveResult<usize> {
        let mut refuted = Vec::new();
        for (id, entity) in &self.entities {
            for term in terms {
                if let Resolution::Resolved(value) = term.resolve(entity)? {
                    if !value.is_true() {
                        refuted.push(id.clone());
                        break;
                    }
                }
            }
        }

        for id in &refuted {
            trace!("Rejecting {:?}", id);
            self.entities.shift_remove(id);
        }
        let count = refuted.len();
        self.rejected.extend(refuted);
        Ok(count)
    }

    /// Re-arm retired sources that have not seen every identity
    fn rearm(&mut self) {
        for slot in self.slots.iter_mut().filter(|slot| !slot.armed) {
            if self.entities.keys().any(|id| !slot.seen.contains(id)) {
                slot.armed = true;
            }
        }
    }
}

/// Terms not yet decided for every entity in the working set
fn pending_terms<Id: EntityId>(terms: &[Comparison], entities: &Entities<Id>) -> Vec<Comparison> {
    if entities.is_empty() {
        return terms.to_vec();
    }
    terms
        .iter()
        .filter(|term| entities.values().any(|entity| !term.is_resolvable(entity)))
        .cloned()
        .collect()
}

fn union_into<Id: EntityId>(into: &mut Entities<Id>, from: Entities<Id>) {
    for (id, entity) in from {
        match into.entry(id) {
            Entry::Occupied(mut existing) => {
                let existing = existing.get_mut();
                for (field, value) in entity.fields() {
                    existing.add_field(field.clone(), value.clone());
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(entity);
            }
        }
    }
}

fn extend_unique(into: &mut Vec<Comparison>, terms: Vec<Comparison>) {
    for term in terms {
        if !into.contains(&term) {
            into.push(term);
        }
    }
}

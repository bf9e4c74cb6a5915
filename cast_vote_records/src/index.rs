use std::collections::HashMap;

use crate::model::*;

/// What an identifier designates inside a document.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum EntityKind {
    Party,
    Candidate,
    Contest,
    ContestSelection,
    GpUnit,
    ReportingDevice,
    Election,
    Cvr,
    CvrSnapshot,
    CvrContest,
    CvrContestSelection,
}

// Identifiers are unique across all the kinds, since they all end up
// as ObjectId attributes of the same document.
#[derive(Debug, Default)]
pub(crate) struct IdIndex<'a> {
    kinds: HashMap<&'a str, EntityKind>,
}

impl<'a> IdIndex<'a> {
    pub(crate) fn insert(&mut self, id: &'a str, kind: EntityKind) -> Result<(), CvrErrors> {
        if self.kinds.insert(id, kind).is_some() {
            return Err(CvrErrors::DuplicateId { id: id.to_string() });
        }
        Ok(())
    }

    pub(crate) fn kind_of(&self, id: &str) -> Option<EntityKind> {
        self.kinds.get(id).copied()
    }

    /// Checks that `reference`, used by the entity `from`, designates an entity of the given kind.
    pub(crate) fn resolve(
        &self,
        from: &str,
        reference: &str,
        kind: EntityKind,
    ) -> Result<(), CvrErrors> {
        match self.kind_of(reference) {
            Some(k) if k == kind => Ok(()),
            _ => Err(CvrErrors::UndeclaredReference {
                from: from.to_string(),
                reference: reference.to_string(),
            }),
        }
    }

    /// Registers all the identifiers of an election definition and checks the
    /// references between them.
    pub(crate) fn index_election(
        &mut self,
        election: &'a Election,
        parties: &'a [Party],
        scope: &'a GpUnit,
        device: &'a ReportingDevice,
    ) -> Result<(), CvrErrors> {
        self.insert(election.id.as_str(), EntityKind::Election)?;
        self.insert(scope.id.as_str(), EntityKind::GpUnit)?;
        self.insert(device.id.as_str(), EntityKind::ReportingDevice)?;
        for p in parties.iter() {
            self.insert(p.id.as_str(), EntityKind::Party)?;
        }
        for c in election.candidates.iter() {
            self.insert(c.id.as_str(), EntityKind::Candidate)?;
        }
        for contest in election.contests.iter() {
            self.insert(contest.id.as_str(), EntityKind::Contest)?;
            for sel in contest.selections.iter() {
                self.insert(sel.id.as_str(), EntityKind::ContestSelection)?;
            }
        }

        self.resolve(&election.id, &election.scope_id, EntityKind::GpUnit)?;
        for c in election.candidates.iter() {
            if let Some(party_id) = &c.party_id {
                self.resolve(&c.id, party_id, EntityKind::Party)?;
            }
        }
        for contest in election.contests.iter() {
            if let ContestKind::Candidate {
                primary_party_id: Some(party_id),
                ..
            } = &contest.kind
            {
                self.resolve(&contest.id, party_id, EntityKind::Party)?;
            }
            let mut write_ins = 0;
            for sel in contest.selections.iter() {
                if !contest.accepts(sel) {
                    return Err(CvrErrors::SelectionKindMismatch {
                        contest_id: contest.id.clone(),
                        selection_id: sel.id.clone(),
                    });
                }
                if let SelectionKind::Candidate {
                    candidate_id,
                    is_write_in,
                } = &sel.kind
                {
                    self.resolve(&sel.id, candidate_id, EntityKind::Candidate)?;
                    if *is_write_in {
                        write_ins += 1;
                    }
                }
            }
            if write_ins > 1 {
                return Err(CvrErrors::MultipleWriteIns {
                    contest_id: contest.id.clone(),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn into_owned(self) -> HashMap<String, EntityKind> {
        self.kinds
            .into_iter()
            .map(|(id, kind)| (id.to_string(), kind))
            .collect()
    }
}

use std::collections::{HashMap, HashSet};

use log::{debug, info};

use crate::index::{EntityKind, IdIndex};
use crate::model::*;

/// A builder for the definitions shared by all the ballots of an election.
///
/// All the checks are done when calling [CatalogBuilder::build], which
/// returns an immutable [Catalog].
///
/// ```
/// use cast_vote_records::*;
///
/// let catalog = CatalogBuilder::new("_election", "Fall 2018")
///     .scope(GpUnit::new("_ward9", "Ward 9", ReportingUnitType::Precinct))
///     .reporting_device(ReportingDevice::new("_tabulator"))
///     .party(Party::new("_dem", "DEM", "Democratic"))
///     .candidate(Candidate::new("_evers", "DEM Tony Evers", Some("_dem")))
///     .contest(
///         Contest::candidate(
///             "_gov",
///             "Governor",
///             vec![ContestSelection::candidate("_sel_evers", "_evers")],
///         ),
///         "gov",
///     )
///     .build()?;
///
/// assert!(catalog.contest_by_name("Governor").is_some());
/// # Ok::<(), CvrErrors>(())
/// ```
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    pub(crate) _election_id: String,
    pub(crate) _election_name: String,
    pub(crate) _scope: Option<GpUnit>,
    pub(crate) _reporting_device: Option<ReportingDevice>,
    pub(crate) _parties: Vec<Party>,
    pub(crate) _candidates: Vec<Candidate>,
    pub(crate) _contests: Vec<(Contest, String)>,
}

impl CatalogBuilder {
    pub fn new(election_id: &str, election_name: &str) -> CatalogBuilder {
        CatalogBuilder {
            _election_id: election_id.to_string(),
            _election_name: election_name.to_string(),
            _scope: None,
            _reporting_device: None,
            _parties: Vec::new(),
            _candidates: Vec::new(),
            _contests: Vec::new(),
        }
    }

    /// The reporting unit covered by the election.
    pub fn scope(self, gp_unit: GpUnit) -> CatalogBuilder {
        CatalogBuilder {
            _scope: Some(gp_unit),
            ..self
        }
    }

    pub fn reporting_device(self, device: ReportingDevice) -> CatalogBuilder {
        CatalogBuilder {
            _reporting_device: Some(device),
            ..self
        }
    }

    pub fn party(mut self, party: Party) -> CatalogBuilder {
        self._parties.push(party);
        self
    }

    pub fn candidate(mut self, candidate: Candidate) -> CatalogBuilder {
        self._candidates.push(candidate);
        self
    }

    /// Adds a contest. The short code is used to derive the identifiers of
    /// the per-ballot records of this contest.
    pub fn contest(mut self, contest: Contest, short_code: &str) -> CatalogBuilder {
        self._contests.push((contest, short_code.to_string()));
        self
    }

    pub fn build(self) -> Result<Catalog, CvrErrors> {
        let scope = self._scope.ok_or(CvrErrors::MissingDefinition {
            what: "election scope",
        })?;
        let reporting_device = self._reporting_device.ok_or(CvrErrors::MissingDefinition {
            what: "reporting device",
        })?;

        let mut short_codes: Vec<String> = Vec::new();
        let mut contests: Vec<Contest> = Vec::new();
        for (contest, short_code) in self._contests {
            if short_codes.contains(&short_code) {
                return Err(CvrErrors::DuplicateContest {
                    field: "short code",
                    value: short_code,
                });
            }
            if contests.iter().any(|c| c.name == contest.name) {
                return Err(CvrErrors::DuplicateContest {
                    field: "name",
                    value: contest.name,
                });
            }
            short_codes.push(short_code);
            contests.push(contest);
        }

        let election = Election {
            id: self._election_id,
            name: self._election_name,
            scope_id: scope.id.clone(),
            candidates: self._candidates,
            contests,
        };

        let index = {
            let mut index = IdIndex::default();
            index.index_election(&election, &self._parties, &scope, &reporting_device)?;
            index.into_owned()
        };

        let candidate_names: HashMap<&str, &str> = election
            .candidates
            .iter()
            .map(|c| (c.id.as_str(), c.name.as_str()))
            .collect();

        let mut definitions: Vec<ContestDefinition> = Vec::new();
        for (contest, short_code) in election.contests.iter().zip(short_codes) {
            let mut labels: HashMap<String, usize> = HashMap::new();
            let mut seen: HashSet<String> = HashSet::new();
            for (idx, sel) in contest.selections.iter().enumerate() {
                let label = match &sel.kind {
                    SelectionKind::Candidate { candidate_id, .. } => candidate_names
                        .get(candidate_id.as_str())
                        .map(|n| n.to_string())
                        .ok_or_else(|| CvrErrors::UndeclaredReference {
                            from: sel.id.clone(),
                            reference: candidate_id.clone(),
                        })?,
                    SelectionKind::BallotMeasure { selection } => selection.clone(),
                };
                if !seen.insert(label.clone()) {
                    return Err(CvrErrors::DuplicateLabel {
                        contest_id: contest.id.clone(),
                        label,
                    });
                }
                labels.insert(label, idx);
            }
            debug!(
                "build: contest {:?} ({}) labels: {:?}",
                contest.name, short_code, labels
            );
            definitions.push(ContestDefinition { short_code, labels });
        }

        info!(
            "Built catalog for election {:?}: {} parties, {} candidates, {} contests",
            election.name,
            self._parties.len(),
            election.candidates.len(),
            election.contests.len()
        );

        Ok(Catalog {
            election,
            scope,
            reporting_device,
            parties: self._parties,
            definitions,
            index,
        })
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
struct ContestDefinition {
    short_code: String,
    // label -> position in the selections of the contest
    labels: HashMap<String, usize>,
}

/// The immutable definitions of an election: reference entities, contests
/// and the lookups needed to read ballots.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Catalog {
    election: Election,
    scope: GpUnit,
    reporting_device: ReportingDevice,
    parties: Vec<Party>,
    definitions: Vec<ContestDefinition>,
    index: HashMap<String, EntityKind>,
}

/// A contest of a [Catalog], along with its ballot label lookup.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct ContestEntry<'a> {
    pub contest: &'a Contest,
    pub short_code: &'a str,
    labels: &'a HashMap<String, usize>,
}

impl<'a> ContestEntry<'a> {
    /// The selection printed with the given label in the ballot tables.
    pub fn lookup(&self, label: &str) -> Option<&'a ContestSelection> {
        self.labels
            .get(label)
            .and_then(|idx| self.contest.selections.get(*idx))
    }
}

impl Catalog {
    pub fn election(&self) -> &Election {
        &self.election
    }

    pub fn scope(&self) -> &GpUnit {
        &self.scope
    }

    pub fn reporting_device(&self) -> &ReportingDevice {
        &self.reporting_device
    }

    pub fn parties(&self) -> &[Party] {
        &self.parties
    }

    /// The contests, in definition order.
    pub fn contests(&self) -> impl Iterator<Item = ContestEntry<'_>> {
        self.election
            .contests
            .iter()
            .zip(self.definitions.iter())
            .map(|(contest, def)| ContestEntry {
                contest,
                short_code: def.short_code.as_str(),
                labels: &def.labels,
            })
    }

    pub fn contest_by_name(&self, name: &str) -> Option<ContestEntry<'_>> {
        self.contests().find(|e| e.contest.name == name)
    }

    /// The kind of entity an identifier designates, if the catalog defines it.
    pub fn kind_of(&self, id: &str) -> Option<EntityKind> {
        self.index.get(id).copied()
    }

    pub fn candidate(&self, id: &str) -> Option<&Candidate> {
        match self.kind_of(id) {
            Some(EntityKind::Candidate) => self.election.candidates.iter().find(|c| c.id == id),
            _ => None,
        }
    }

    pub fn party(&self, id: &str) -> Option<&Party> {
        match self.kind_of(id) {
            Some(EntityKind::Party) => self.parties.iter().find(|p| p.id == id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn governor_builder() -> CatalogBuilder {
        CatalogBuilder::new("_election", "Test election")
            .scope(GpUnit::new("_gp", "Ward 9", ReportingUnitType::Precinct))
            .reporting_device(ReportingDevice::new("_dev"))
            .party(Party::new("_Dem", "DEM", "Democratic"))
            .party(Party::new("_GOP", "GOP", "Republican"))
            .candidate(Candidate::new("_evers", "DEM Tony Evers", Some("_Dem")))
            .candidate(Candidate::new("_walker", "REP Scott Walker", Some("_GOP")))
            .candidate(Candidate::new("_gov_wi", "write-in:", None))
    }

    fn governor_contest() -> Contest {
        Contest::candidate(
            "_Contest_GOV",
            "Governor",
            vec![
                ContestSelection::candidate("_sel_walker", "_walker"),
                ContestSelection::candidate("_sel_evers", "_evers"),
                ContestSelection::write_in("_sel_gov_wi", "_gov_wi"),
            ],
        )
    }

    #[test]
    fn labels_resolve_to_selections() {
        let catalog = governor_builder()
            .contest(governor_contest(), "gov")
            .contest(
                Contest::ballot_measure(
                    "_Contest_Tax",
                    "Tax referendum",
                    vec![
                        ContestSelection::ballot_measure("_sel_tax_yes", "Yes"),
                        ContestSelection::ballot_measure("_sel_tax_no", "No"),
                    ],
                ),
                "tax",
            )
            .build()
            .unwrap();

        let gov = catalog.contest_by_name("Governor").unwrap();
        assert_eq!(gov.short_code, "gov");
        assert_eq!(gov.lookup("DEM Tony Evers").unwrap().id, "_sel_evers");
        assert!(gov.lookup("write-in:").unwrap().is_write_in());
        assert!(gov.lookup("Yes").is_none());

        let tax = catalog.contest_by_name("Tax referendum").unwrap();
        assert_eq!(tax.lookup("No").unwrap().id, "_sel_tax_no");

        let names: Vec<&str> = catalog.contests().map(|e| e.contest.name.as_str()).collect();
        assert_eq!(names, vec!["Governor", "Tax referendum"]);
    }

    #[test]
    fn index_knows_every_definition() {
        let catalog = governor_builder()
            .contest(governor_contest(), "gov")
            .build()
            .unwrap();
        assert_eq!(catalog.kind_of("_Dem"), Some(EntityKind::Party));
        assert_eq!(catalog.kind_of("_sel_evers"), Some(EntityKind::ContestSelection));
        assert_eq!(catalog.kind_of("_gp"), Some(EntityKind::GpUnit));
        assert_eq!(catalog.kind_of("_nothing"), None);
        assert_eq!(catalog.candidate("_walker").unwrap().name, "REP Scott Walker");
        assert!(catalog.candidate("_Dem").is_none());
        assert_eq!(catalog.party("_GOP").unwrap().abbreviation, "GOP");
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let res = governor_builder()
            .party(Party::new("_evers", "EVR", "Evers party"))
            .contest(governor_contest(), "gov")
            .build();
        assert_eq!(
            res,
            Err(CvrErrors::DuplicateId {
                id: "_evers".to_string()
            })
        );
    }

    #[test]
    fn undeclared_candidate_is_rejected() {
        let contest = Contest::candidate(
            "_Contest_AG",
            "Attorney General",
            vec![ContestSelection::candidate("_sel_kaul", "_kaul")],
        );
        let res = governor_builder().contest(contest, "ag").build();
        assert_eq!(
            res,
            Err(CvrErrors::UndeclaredReference {
                from: "_sel_kaul".to_string(),
                reference: "_kaul".to_string()
            })
        );
    }

    #[test]
    fn undeclared_party_is_rejected() {
        let res = governor_builder()
            .candidate(Candidate::new("_larson", "CON Terry Larson", Some("_Con")))
            .build();
        assert!(matches!(
            res,
            Err(CvrErrors::UndeclaredReference { reference, .. }) if reference == "_Con"
        ));
    }

    #[test]
    fn at_most_one_write_in() {
        let mut contest = governor_contest();
        contest
            .selections
            .push(ContestSelection::write_in("_sel_gov_wi2", "_walker"));
        let res = governor_builder().contest(contest, "gov").build();
        assert_eq!(
            res,
            Err(CvrErrors::MultipleWriteIns {
                contest_id: "_Contest_GOV".to_string()
            })
        );
    }

    #[test]
    fn selection_kinds_match_contest_kind() {
        let contest = Contest::ballot_measure(
            "_Contest_Tax",
            "Tax referendum",
            vec![ContestSelection::candidate("_sel_tax_evers", "_evers")],
        );
        let res = governor_builder().contest(contest, "tax").build();
        assert!(matches!(
            res,
            Err(CvrErrors::SelectionKindMismatch { .. })
        ));
    }

    #[test]
    fn duplicate_short_codes_and_labels() {
        let other = Contest::ballot_measure(
            "_Contest_Tax",
            "Tax referendum",
            vec![ContestSelection::ballot_measure("_sel_tax_yes", "Yes")],
        );
        let res = governor_builder()
            .contest(governor_contest(), "gov")
            .contest(other, "gov")
            .build();
        assert!(matches!(
            res,
            Err(CvrErrors::DuplicateContest {
                field: "short code",
                ..
            })
        ));

        let twice = Contest::ballot_measure(
            "_Contest_Tax",
            "Tax referendum",
            vec![
                ContestSelection::ballot_measure("_sel_tax_yes", "Yes"),
                ContestSelection::ballot_measure("_sel_tax_yes2", "Yes"),
            ],
        );
        let res = governor_builder().contest(twice, "tax").build();
        assert!(matches!(res, Err(CvrErrors::DuplicateLabel { .. })));
    }

    #[test]
    fn scope_and_device_are_required() {
        let res = CatalogBuilder::new("_e", "E")
            .reporting_device(ReportingDevice::new("_dev"))
            .build();
        assert_eq!(
            res,
            Err(CvrErrors::MissingDefinition {
                what: "election scope"
            })
        );
    }
}

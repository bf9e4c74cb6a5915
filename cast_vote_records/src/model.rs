// ********* Reference entities ***********

use std::error::Error;
use std::fmt::Display;

/// The classification scheme of a [Code].
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum IdentifierType {
    Fips,
    LocalLevel,
    NationalLevel,
    OcdId,
    StateLevel,
    Other,
}

impl IdentifierType {
    pub const ALL: [IdentifierType; 6] = [
        IdentifierType::Fips,
        IdentifierType::LocalLevel,
        IdentifierType::NationalLevel,
        IdentifierType::OcdId,
        IdentifierType::StateLevel,
        IdentifierType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IdentifierType::Fips => "fips",
            IdentifierType::LocalLevel => "local-level",
            IdentifierType::NationalLevel => "national-level",
            IdentifierType::OcdId => "ocd-id",
            IdentifierType::StateLevel => "state-level",
            IdentifierType::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<IdentifierType> {
        IdentifierType::ALL.iter().copied().find(|t| t.as_str() == s)
    }
}

/// The vote variations of the CVR schema.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum VoteVariation {
    Approval,
    Borda,
    Cumulative,
    Majority,
    NOfM,
    Plurality,
    Proportional,
    Range,
    Rcv,
    SuperMajority,
    Other,
}

impl VoteVariation {
    pub const ALL: [VoteVariation; 11] = [
        VoteVariation::Approval,
        VoteVariation::Borda,
        VoteVariation::Cumulative,
        VoteVariation::Majority,
        VoteVariation::NOfM,
        VoteVariation::Plurality,
        VoteVariation::Proportional,
        VoteVariation::Range,
        VoteVariation::Rcv,
        VoteVariation::SuperMajority,
        VoteVariation::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VoteVariation::Approval => "approval",
            VoteVariation::Borda => "borda",
            VoteVariation::Cumulative => "cumulative",
            VoteVariation::Majority => "majority",
            VoteVariation::NOfM => "n-of-m",
            VoteVariation::Plurality => "plurality",
            VoteVariation::Proportional => "proportional",
            VoteVariation::Range => "range",
            VoteVariation::Rcv => "rcv",
            VoteVariation::SuperMajority => "super-majority",
            VoteVariation::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<VoteVariation> {
        VoteVariation::ALL.iter().copied().find(|v| v.as_str() == s)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum ReportingUnitType {
    CombinedPrecinct,
    Precinct,
}

impl ReportingUnitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportingUnitType::CombinedPrecinct => "combined-precinct",
            ReportingUnitType::Precinct => "precinct",
        }
    }

    pub fn parse(s: &str) -> Option<ReportingUnitType> {
        [
            ReportingUnitType::CombinedPrecinct,
            ReportingUnitType::Precinct,
        ]
        .iter()
        .copied()
        .find(|t| t.as_str() == s)
    }
}

/// The kind of interpretation a snapshot represents.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Default)]
pub enum CvrType {
    Interpreted,
    Modified,
    #[default]
    Original,
}

impl CvrType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CvrType::Interpreted => "interpreted",
            CvrType::Modified => "modified",
            CvrType::Original => "original",
        }
    }
}

/// Whether a selection position carries a mark.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Default)]
pub enum IndicationStatus {
    No,
    Unknown,
    #[default]
    Yes,
}

impl IndicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicationStatus::No => "no",
            IndicationStatus::Unknown => "unknown",
            IndicationStatus::Yes => "yes",
        }
    }
}

/// Whether a mark should be counted towards the tabulation.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Default)]
pub enum AllocationStatus {
    No,
    Unknown,
    #[default]
    Yes,
}

impl AllocationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationStatus::No => "no",
            AllocationStatus::Unknown => "unknown",
            AllocationStatus::Yes => "yes",
        }
    }
}

/// A typed jurisdiction tag. The type/value pair is opaque to this crate.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Code {
    pub code_type: IdentifierType,
    pub value: String,
    pub label: Option<String>,
    /// Only meaningful with [IdentifierType::Other].
    pub other_type: Option<String>,
}

impl Code {
    pub fn new(code_type: IdentifierType, value: &str) -> Code {
        Code {
            code_type,
            value: value.to_string(),
            label: None,
            other_type: None,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Party {
    pub id: String,
    pub abbreviation: String,
    pub name: String,
}

impl Party {
    pub fn new(id: &str, abbreviation: &str, name: &str) -> Party {
        Party {
            id: id.to_string(),
            abbreviation: abbreviation.to_string(),
            name: name.to_string(),
        }
    }
}

/// A person (or a write-in slot) standing in a contest.
///
/// The name is also the label printed in the ballot tables.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub party_id: Option<String>,
    pub code: Option<Code>,
}

impl Candidate {
    pub fn new(id: &str, name: &str, party_id: Option<&str>) -> Candidate {
        Candidate {
            id: id.to_string(),
            name: name.to_string(),
            party_id: party_id.map(|s| s.to_string()),
            code: None,
        }
    }
}

// ********* Contest definitions ***********

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SelectionKind {
    Candidate {
        candidate_id: String,
        is_write_in: bool,
    },
    BallotMeasure {
        /// The response printed on the ballot ("Yes", "No", ...)
        selection: String,
    },
}

/// One option of a contest.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ContestSelection {
    pub id: String,
    pub code: Option<Code>,
    pub kind: SelectionKind,
}

impl ContestSelection {
    pub fn candidate(id: &str, candidate_id: &str) -> ContestSelection {
        ContestSelection {
            id: id.to_string(),
            code: None,
            kind: SelectionKind::Candidate {
                candidate_id: candidate_id.to_string(),
                is_write_in: false,
            },
        }
    }

    pub fn write_in(id: &str, candidate_id: &str) -> ContestSelection {
        ContestSelection {
            id: id.to_string(),
            code: None,
            kind: SelectionKind::Candidate {
                candidate_id: candidate_id.to_string(),
                is_write_in: true,
            },
        }
    }

    pub fn ballot_measure(id: &str, selection: &str) -> ContestSelection {
        ContestSelection {
            id: id.to_string(),
            code: None,
            kind: SelectionKind::BallotMeasure {
                selection: selection.to_string(),
            },
        }
    }

    pub fn is_write_in(&self) -> bool {
        matches!(
            self.kind,
            SelectionKind::Candidate {
                is_write_in: true,
                ..
            }
        )
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ContestKind {
    Candidate {
        number_elected: u32,
        votes_allowed: u32,
        primary_party_id: Option<String>,
    },
    BallotMeasure,
}

/// An office or a ballot question, defined once per election.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Contest {
    pub id: String,
    pub name: String,
    pub abbreviation: Option<String>,
    pub code: Option<Code>,
    pub vote_variation: Option<VoteVariation>,
    pub other_vote_variation: Option<String>,
    pub selections: Vec<ContestSelection>,
    pub kind: ContestKind,
}

impl Contest {
    /// A candidate contest electing one person with one vote allowed.
    pub fn candidate(id: &str, name: &str, selections: Vec<ContestSelection>) -> Contest {
        Contest {
            id: id.to_string(),
            name: name.to_string(),
            abbreviation: None,
            code: None,
            vote_variation: None,
            other_vote_variation: None,
            selections,
            kind: ContestKind::Candidate {
                number_elected: 1,
                votes_allowed: 1,
                primary_party_id: None,
            },
        }
    }

    pub fn ballot_measure(id: &str, name: &str, selections: Vec<ContestSelection>) -> Contest {
        Contest {
            id: id.to_string(),
            name: name.to_string(),
            abbreviation: None,
            code: None,
            vote_variation: None,
            other_vote_variation: None,
            selections,
            kind: ContestKind::BallotMeasure,
        }
    }

    pub fn with_vote_variation(self, vote_variation: VoteVariation) -> Contest {
        Contest {
            vote_variation: Some(vote_variation),
            ..self
        }
    }

    pub fn selection(&self, selection_id: &str) -> Option<&ContestSelection> {
        self.selections.iter().find(|s| s.id == selection_id)
    }

    /// True if the selection variant can appear in this contest variant.
    pub fn accepts(&self, selection: &ContestSelection) -> bool {
        matches!(
            (&self.kind, &selection.kind),
            (ContestKind::Candidate { .. }, SelectionKind::Candidate { .. })
                | (ContestKind::BallotMeasure, SelectionKind::BallotMeasure { .. })
        )
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct GpUnit {
    pub id: String,
    pub name: String,
    pub unit_type: ReportingUnitType,
    pub code: Option<Code>,
}

impl GpUnit {
    pub fn new(id: &str, name: &str, unit_type: ReportingUnitType) -> GpUnit {
        GpUnit {
            id: id.to_string(),
            name: name.to_string(),
            unit_type,
            code: None,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ReportingDevice {
    pub id: String,
    pub model: Option<String>,
    pub notes: Option<String>,
}

impl ReportingDevice {
    pub fn new(id: &str) -> ReportingDevice {
        ReportingDevice {
            id: id.to_string(),
            model: None,
            notes: None,
        }
    }
}

/// The full ballot definition of one voting event.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Election {
    pub id: String,
    pub name: String,
    /// Identifier of the [GpUnit] the election covers.
    pub scope_id: String,
    pub candidates: Vec<Candidate>,
    pub contests: Vec<Contest>,
}

// ********* Per-ballot records ***********

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SelectionPosition {
    pub has_indication: IndicationStatus,
    pub is_allocable: AllocationStatus,
    pub number_votes: u32,
}

impl Default for SelectionPosition {
    fn default() -> Self {
        SelectionPosition {
            has_indication: IndicationStatus::Yes,
            is_allocable: AllocationStatus::Yes,
            number_votes: 1,
        }
    }
}

/// One mark against a [ContestSelection] on one ballot.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CvrContestSelection {
    pub id: String,
    pub contest_selection_id: String,
    pub position: SelectionPosition,
    pub total_number_votes: u32,
}

impl CvrContestSelection {
    pub fn new(id: &str, contest_selection_id: &str) -> CvrContestSelection {
        CvrContestSelection {
            id: id.to_string(),
            contest_selection_id: contest_selection_id.to_string(),
            position: SelectionPosition::default(),
            total_number_votes: 1,
        }
    }
}

/// The outcome of one contest on one ballot.
///
/// Either some selections are marked, or the contest is recorded as an
/// overvote or an undervote, never both. The constructors only build
/// consistent values.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CvrContest {
    pub id: String,
    pub contest_id: String,
    pub selections: Vec<CvrContestSelection>,
    pub overvotes: u32,
    pub undervotes: u32,
    pub write_ins: u32,
}

impl CvrContest {
    pub fn marked(id: &str, contest_id: &str, selections: Vec<CvrContestSelection>) -> CvrContest {
        CvrContest {
            id: id.to_string(),
            contest_id: contest_id.to_string(),
            selections,
            overvotes: 0,
            undervotes: 0,
            write_ins: 0,
        }
    }

    pub fn overvote(id: &str, contest_id: &str) -> CvrContest {
        CvrContest {
            overvotes: 1,
            ..CvrContest::marked(id, contest_id, vec![])
        }
    }

    pub fn undervote(id: &str, contest_id: &str) -> CvrContest {
        CvrContest {
            undervotes: 1,
            ..CvrContest::marked(id, contest_id, vec![])
        }
    }

    pub fn with_write_ins(self, write_ins: u32) -> CvrContest {
        CvrContest { write_ins, ..self }
    }

    /// Selections and over/undervote counts are mutually exclusive, and an
    /// outcome always records something.
    pub fn is_consistent(&self) -> bool {
        let counted = self.overvotes > 0 || self.undervotes > 0;
        if self.selections.is_empty() {
            counted || self.write_ins > 0
        } else {
            !counted
        }
    }
}

/// One interpretation of a ballot.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CvrSnapshot {
    pub id: String,
    pub snapshot_type: CvrType,
    pub contests: Vec<CvrContest>,
}

impl CvrSnapshot {
    pub fn original(id: &str, contests: Vec<CvrContest>) -> CvrSnapshot {
        CvrSnapshot {
            id: id.to_string(),
            snapshot_type: CvrType::Original,
            contests,
        }
    }
}

/// One physical ballot.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Cvr {
    pub id: String,
    /// The ballot identifier from the source tabulation.
    pub unique_id: String,
    pub election_id: String,
    /// The first snapshot is the current one.
    pub snapshots: Vec<CvrSnapshot>,
    pub creating_device_id: Option<String>,
    pub ballot_pre_printed_id: Option<String>,
}

impl Cvr {
    pub fn current_snapshot(&self) -> Option<&CvrSnapshot> {
        self.snapshots.first()
    }
}

// ********* Errors ***********

/// Errors that prevent a consistent document from being produced.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum CvrErrors {
    DuplicateId {
        id: String,
    },
    UndeclaredReference {
        from: String,
        reference: String,
    },
    MultipleWriteIns {
        contest_id: String,
    },
    SelectionKindMismatch {
        contest_id: String,
        selection_id: String,
    },
    DuplicateLabel {
        contest_id: String,
        label: String,
    },
    DuplicateContest {
        field: &'static str,
        value: String,
    },
    MissingDefinition {
        what: &'static str,
    },
    MissingColumn {
        column: String,
    },
    ShortRow {
        lineno: usize,
        expected: usize,
        found: usize,
    },
    EmptyBallotId {
        lineno: usize,
    },
    InvalidBallotId {
        lineno: usize,
        ballot_id: String,
    },
    UnrecognizedValue {
        ballot_id: String,
        contest: String,
        value: String,
    },
    EmptySnapshots {
        cvr_id: String,
    },
    InconsistentOutcome {
        cvr_contest_id: String,
    },
    SelectionOutsideContest {
        cvr_contest_id: String,
        selection_id: String,
    },
}

impl Error for CvrErrors {}

impl Display for CvrErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CvrErrors::DuplicateId { id } => write!(f, "identifier {:?} is defined twice", id),
            CvrErrors::UndeclaredReference { from, reference } => write!(
                f,
                "{:?} references {:?}, which is not declared",
                from, reference
            ),
            CvrErrors::MultipleWriteIns { contest_id } => write!(
                f,
                "contest {:?} has more than one write-in selection",
                contest_id
            ),
            CvrErrors::SelectionKindMismatch {
                contest_id,
                selection_id,
            } => write!(
                f,
                "selection {:?} does not match the kind of contest {:?}",
                selection_id, contest_id
            ),
            CvrErrors::DuplicateLabel { contest_id, label } => write!(
                f,
                "contest {:?} has two selections labelled {:?}",
                contest_id, label
            ),
            CvrErrors::DuplicateContest { field, value } => {
                write!(f, "two contests share the {} {:?}", field, value)
            }
            CvrErrors::MissingDefinition { what } => write!(f, "no {} was defined", what),
            CvrErrors::MissingColumn { column } => {
                write!(f, "column {:?} is missing from the input header", column)
            }
            CvrErrors::ShortRow {
                lineno,
                expected,
                found,
            } => write!(
                f,
                "line {}: expected at least {} cells, found {}",
                lineno, expected, found
            ),
            CvrErrors::EmptyBallotId { lineno } => write!(f, "line {}: empty ballot id", lineno),
            CvrErrors::InvalidBallotId { lineno, ballot_id } => write!(
                f,
                "line {}: ballot id {:?} may only contain letters, digits, '-', '.' and '_'",
                lineno, ballot_id
            ),
            CvrErrors::UnrecognizedValue {
                ballot_id,
                contest,
                value,
            } => write!(
                f,
                "ballot {:?}: value {:?} is not a selection of contest {:?}",
                ballot_id, value, contest
            ),
            CvrErrors::EmptySnapshots { cvr_id } => {
                write!(f, "CVR {:?} has no snapshot", cvr_id)
            }
            CvrErrors::InconsistentOutcome { cvr_contest_id } => write!(
                f,
                "CVR contest {:?} must have either selections or an overvote/undervote count",
                cvr_contest_id
            ),
            CvrErrors::SelectionOutsideContest {
                cvr_contest_id,
                selection_id,
            } => write!(
                f,
                "CVR contest {:?} marks selection {:?}, which belongs to another contest",
                cvr_contest_id, selection_id
            ),
        }
    }
}

// Structural checks of a CVR document, read back from its text.
//
// This does not validate against the XSD: it checks the shape this crate
// produces (root, sections, required elements) and that every reference
// resolves to an ObjectId of the document.

use std::collections::HashSet;
use std::fmt::Display;

use log::{debug, info};
use roxmltree::{Document, Node};

pub const ROOT_ELEMENT: &str = "CastVoteRecordReport";

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum Occurs {
    Optional,
    Once,
    Many,
}

// Children of the root, in document order.
const SECTIONS: [(&str, Occurs); 9] = [
    ("CVR", Occurs::Many),
    ("Election", Occurs::Once),
    ("GeneratedDate", Occurs::Once),
    ("GpUnit", Occurs::Once),
    ("Notes", Occurs::Optional),
    ("Party", Occurs::Many),
    ("ReportGeneratingDeviceIds", Occurs::Once),
    ("ReportingDevice", Occurs::Once),
    ("Version", Occurs::Once),
];

const REQUIRED_CHILDREN: [(&str, &[&str]); 11] = [
    ("CVR", &["CurrentSnapshotId", "CVRSnapshot", "ElectionId", "UniqueId"]),
    ("CVRSnapshot", &["Type"]),
    ("CVRContest", &["ContestId", "Overvotes", "Undervotes", "WriteIns"]),
    (
        "CVRContestSelection",
        &["ContestSelectionId", "SelectionPosition", "TotalNumberVotes"],
    ),
    (
        "SelectionPosition",
        &["HasIndication", "IsAllocable", "NumberVotes"],
    ),
    ("Election", &["ElectionScopeId", "Name"]),
    ("Contest", &["Name"]),
    ("Candidate", &["Name"]),
    ("Party", &["Abbreviation", "Name"]),
    ("GpUnit", &["Name", "Type"]),
    ("Code", &["Type", "Value"]),
];

const IDENTIFIED: [&str; 11] = [
    "CVR",
    "CVRSnapshot",
    "CVRContest",
    "CVRContestSelection",
    "Election",
    "Contest",
    "ContestSelection",
    "Candidate",
    "Party",
    "GpUnit",
    "ReportingDevice",
];

// Elements whose text holds one or more (whitespace separated) ObjectIds.
const REFERENCES: [&str; 10] = [
    "PartyId",
    "PrimaryPartyId",
    "CandidateIds",
    "ContestId",
    "ContestSelectionId",
    "CurrentSnapshotId",
    "ElectionId",
    "ElectionScopeId",
    "CreatingDeviceId",
    "ReportGeneratingDeviceIds",
];

/// One structural problem found in a document.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum CheckProblem {
    Malformed { detail: String },
    WrongRoot { found: String },
    UnknownSection { name: String },
    MissingSection { name: String },
    RepeatedSection { name: String },
    SectionOutOfOrder { name: String, after: String },
    MissingChild { element: String, child: String },
    MissingObjectId { element: String },
    DuplicateObjectId { id: String },
    DanglingReference { element: String, reference: String },
}

impl Display for CheckProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckProblem::Malformed { detail } => write!(f, "malformed XML: {}", detail),
            CheckProblem::WrongRoot { found } => write!(
                f,
                "root element is <{}>, expected <{}>",
                found, ROOT_ELEMENT
            ),
            CheckProblem::UnknownSection { name } => {
                write!(f, "unexpected section <{}> in the report", name)
            }
            CheckProblem::MissingSection { name } => write!(f, "missing section <{}>", name),
            CheckProblem::RepeatedSection { name } => {
                write!(f, "section <{}> appears more than once", name)
            }
            CheckProblem::SectionOutOfOrder { name, after } => {
                write!(f, "section <{}> must come before <{}>", after, name)
            }
            CheckProblem::MissingChild { element, child } => {
                write!(f, "{} has no <{}>", element, child)
            }
            CheckProblem::MissingObjectId { element } => {
                write!(f, "<{}> has no ObjectId", element)
            }
            CheckProblem::DuplicateObjectId { id } => {
                write!(f, "ObjectId {:?} is used more than once", id)
            }
            CheckProblem::DanglingReference { element, reference } => write!(
                f,
                "<{}> references {:?}, which is not an ObjectId of the document",
                element, reference
            ),
        }
    }
}

/// The outcome of [check_document]: the problems found, in document order.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct CheckReport {
    pub problems: Vec<CheckProblem>,
}

impl CheckReport {
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }
}

fn elements<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|n| n.is_element())
}

fn describe(node: &Node) -> String {
    match node.attribute("ObjectId") {
        Some(id) => format!("<{} ObjectId={:?}>", node.tag_name().name(), id),
        None => format!("<{}>", node.tag_name().name()),
    }
}

fn check_sections(root: Node, problems: &mut Vec<CheckProblem>) {
    let rank_of = |name: &str| SECTIONS.iter().position(|(n, _)| *n == name);
    let mut counts = [0usize; SECTIONS.len()];
    let mut last: Option<usize> = None;
    for child in elements(root) {
        let name = child.tag_name().name();
        let rank = match rank_of(name) {
            Some(r) => r,
            None => {
                problems.push(CheckProblem::UnknownSection {
                    name: name.to_string(),
                });
                continue;
            }
        };
        counts[rank] += 1;
        if let Some(prev) = last {
            if rank < prev {
                problems.push(CheckProblem::SectionOutOfOrder {
                    name: SECTIONS[prev].0.to_string(),
                    after: name.to_string(),
                });
            }
        }
        last = Some(rank.max(last.unwrap_or(0)));
    }

    for ((name, occurs), count) in SECTIONS.iter().zip(counts.iter()) {
        match (occurs, *count) {
            (Occurs::Once, 0) => problems.push(CheckProblem::MissingSection {
                name: name.to_string(),
            }),
            (Occurs::Once | Occurs::Optional, n) if n > 1 => {
                problems.push(CheckProblem::RepeatedSection {
                    name: name.to_string(),
                })
            }
            _ => {}
        }
    }
}

/// Checks the structure of a CVR document.
///
/// Invalid documents, including malformed XML, are reported in the
/// returned [CheckReport], never as an error.
pub fn check_document(text: &str) -> CheckReport {
    let mut problems: Vec<CheckProblem> = Vec::new();
    let doc = match Document::parse(text) {
        Ok(d) => d,
        Err(e) => {
            problems.push(CheckProblem::Malformed {
                detail: e.to_string(),
            });
            return CheckReport { problems };
        }
    };

    let root = doc.root_element();
    if root.tag_name().name() != ROOT_ELEMENT {
        problems.push(CheckProblem::WrongRoot {
            found: root.tag_name().name().to_string(),
        });
        return CheckReport { problems };
    }
    check_sections(root, &mut problems);

    let mut object_ids: HashSet<&str> = HashSet::new();
    for node in root.descendants().filter(|n| n.is_element()) {
        let name = node.tag_name().name();
        if let Some(id) = node.attribute("ObjectId") {
            if !object_ids.insert(id) {
                problems.push(CheckProblem::DuplicateObjectId { id: id.to_string() });
            }
        } else if IDENTIFIED.contains(&name) {
            problems.push(CheckProblem::MissingObjectId {
                element: name.to_string(),
            });
        }

        if let Some((_, required)) = REQUIRED_CHILDREN.iter().find(|(n, _)| *n == name) {
            for child in required.iter() {
                if !elements(node).any(|c| c.tag_name().name() == *child) {
                    problems.push(CheckProblem::MissingChild {
                        element: describe(&node),
                        child: child.to_string(),
                    });
                }
            }
        }
    }

    let mut references = 0;
    for node in root
        .descendants()
        .filter(|n| n.is_element() && REFERENCES.contains(&n.tag_name().name()))
    {
        for reference in node.text().unwrap_or("").split_whitespace() {
            references += 1;
            if !object_ids.contains(reference) {
                problems.push(CheckProblem::DanglingReference {
                    element: node.tag_name().name().to_string(),
                    reference: reference.to_string(),
                });
            }
        }
    }
    debug!(
        "check_document: {} object ids, {} references",
        object_ids.len(),
        references
    );
    info!("Document check found {} problem(s)", problems.len());

    CheckReport { problems }
}

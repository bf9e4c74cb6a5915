/*!
Builds cast vote records (CVR) reports following the NIST CVR data model, and
writes them as XML.

The definitions shared by all the ballots of an election (parties,
candidates, contests, ...) are collected in a [Catalog] with a
[CatalogBuilder]. Each row of a ballot table is then translated into a [Cvr]
by a [RowTranslator], and all the records are bound together in a
[CastVoteRecordReport].

See the [manual] for the catalog file format and the command line program.
*/

pub mod builder;
mod check;
mod index;
pub mod manual;
mod model;
mod render;
mod translate;
pub mod xml;

use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, info};

pub use crate::builder::*;
pub use crate::check::*;
pub use crate::index::EntityKind;
use crate::index::IdIndex;
pub use crate::model::*;
use crate::render::*;
pub use crate::translate::*;
use crate::xml::{write_document, Element};

pub const CVR_NAMESPACE: &str = "NIST_V0_cast_vote_records.xsd";
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const DEFAULT_VERSION: &str = "1.0.0";

/// The report-level fields that do not come from the catalog.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ReportSettings {
    pub version: String,
    pub notes: Option<String>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            version: DEFAULT_VERSION.to_string(),
            notes: None,
        }
    }
}

/// The whole document: the election definition and all the ballots.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CastVoteRecordReport {
    pub cvrs: Vec<Cvr>,
    pub election: Election,
    pub generated_date: Option<DateTime<Utc>>,
    pub gp_unit: GpUnit,
    pub notes: Option<String>,
    pub parties: Vec<Party>,
    pub reporting_device: ReportingDevice,
    pub version: String,
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl CastVoteRecordReport {
    /// Binds the ballots to the definitions of the catalog, stamped with the
    /// current time.
    pub fn assemble(
        catalog: &Catalog,
        cvrs: Vec<Cvr>,
        settings: &ReportSettings,
    ) -> CastVoteRecordReport {
        let generated = Utc::now();
        info!(
            "assemble: {} CVRs for election {:?}, generated {}",
            cvrs.len(),
            catalog.election().name,
            format_timestamp(&generated)
        );
        CastVoteRecordReport {
            cvrs,
            election: catalog.election().clone(),
            generated_date: Some(generated),
            gp_unit: catalog.scope().clone(),
            notes: settings.notes.clone(),
            parties: catalog.parties().to_vec(),
            reporting_device: catalog.reporting_device().clone(),
            version: settings.version.clone(),
        }
    }

    /// Checks that the report can be written as a consistent document.
    ///
    /// The identifiers must be unique across the document, every reference
    /// must resolve to an entity of the right kind, and every CVR contest must
    /// record either marks of its own contest or an overvote/undervote.
    pub fn check_integrity(&self) -> Result<(), CvrErrors> {
        let mut index = IdIndex::default();
        index.index_election(
            &self.election,
            &self.parties,
            &self.gp_unit,
            &self.reporting_device,
        )?;

        for cvr in self.cvrs.iter() {
            index.insert(&cvr.id, EntityKind::Cvr)?;
            if cvr.snapshots.is_empty() {
                return Err(CvrErrors::EmptySnapshots {
                    cvr_id: cvr.id.clone(),
                });
            }
            index.resolve(&cvr.id, &cvr.election_id, EntityKind::Election)?;
            if let Some(device_id) = &cvr.creating_device_id {
                index.resolve(&cvr.id, device_id, EntityKind::ReportingDevice)?;
            }

            for snapshot in cvr.snapshots.iter() {
                index.insert(&snapshot.id, EntityKind::CvrSnapshot)?;
                for cvr_contest in snapshot.contests.iter() {
                    index.insert(&cvr_contest.id, EntityKind::CvrContest)?;
                    index.resolve(&cvr_contest.id, &cvr_contest.contest_id, EntityKind::Contest)?;
                    if !cvr_contest.is_consistent() {
                        return Err(CvrErrors::InconsistentOutcome {
                            cvr_contest_id: cvr_contest.id.clone(),
                        });
                    }
                    let contest = self
                        .election
                        .contests
                        .iter()
                        .find(|c| c.id == cvr_contest.contest_id);
                    for sel in cvr_contest.selections.iter() {
                        index.insert(&sel.id, EntityKind::CvrContestSelection)?;
                        index.resolve(
                            &sel.id,
                            &sel.contest_selection_id,
                            EntityKind::ContestSelection,
                        )?;
                        if contest
                            .and_then(|c| c.selection(&sel.contest_selection_id))
                            .is_none()
                        {
                            return Err(CvrErrors::SelectionOutsideContest {
                                cvr_contest_id: cvr_contest.id.clone(),
                                selection_id: sel.contest_selection_id.clone(),
                            });
                        }
                    }
                }
            }
        }
        debug!("check_integrity: {} CVRs checked", self.cvrs.len());
        Ok(())
    }

    /// Writes the report as an XML document.
    ///
    /// Nothing is produced if the report fails [CastVoteRecordReport::check_integrity].
    /// A report without a generation date is stamped with the current time.
    pub fn to_xml(&self) -> Result<String, CvrErrors> {
        self.check_integrity()?;
        let generated = self.generated_date.unwrap_or_else(Utc::now);
        let cvrs = self
            .cvrs
            .iter()
            .map(cvr_element)
            .collect::<Result<Vec<Element>, CvrErrors>>()?;

        let root = Element::new("CastVoteRecordReport")
            .attr("xmlns", CVR_NAMESPACE)
            .attr("xmlns:xsi", XSI_NAMESPACE)
            .children(cvrs)
            .child(election_element(&self.election))
            .text_child("GeneratedDate", &format_timestamp(&generated))
            .child(gp_unit_element(&self.gp_unit))
            .opt_text_child("Notes", self.notes.as_deref())
            .children(self.parties.iter().map(party_element))
            .text_child("ReportGeneratingDeviceIds", &self.reporting_device.id)
            .child(reporting_device_element(&self.reporting_device))
            .text_child("Version", &self.version);
        let doc = write_document(&root);
        info!("to_xml: wrote {} CVRs ({} bytes)", self.cvrs.len(), doc.len());
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use roxmltree::Document;

    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn catalog() -> Catalog {
        CatalogBuilder::new("_fall_2018", "Fall 2018 Ward 9")
            .scope(GpUnit {
                code: Some(Code::new(IdentifierType::LocalLevel, "City of Madison Ward 9")),
                ..GpUnit::new("_cvr_gp", "Ward 9", ReportingUnitType::Precinct)
            })
            .reporting_device(ReportingDevice {
                model: Some("ESS DS200".to_string()),
                ..ReportingDevice::new("_rpdev_ward9")
            })
            .party(Party::new("_Dem", "DEM", "Democratic"))
            .party(Party::new("_GOP", "GOP", "Republican"))
            .candidate(Candidate::new(
                "_GOV_Evers",
                "DEM Tony Evers /Mandela Barnes",
                Some("_Dem"),
            ))
            .candidate(Candidate::new(
                "_GOV_Walker",
                "REP Scott Walker /Rebecca Kleefisch",
                Some("_GOP"),
            ))
            .candidate(Candidate::new("_GOV_WI", "write-in:", None))
            .contest(
                Contest::candidate(
                    "_Contest_GOV",
                    "Governor",
                    vec![
                        ContestSelection::candidate("_sel_GOV_Evers", "_GOV_Evers"),
                        ContestSelection::candidate("_sel_GOV_Walker", "_GOV_Walker"),
                        ContestSelection::write_in("_sel_GOV_WI", "_GOV_WI"),
                    ],
                )
                .with_vote_variation(VoteVariation::NOfM),
                "gov",
            )
            .contest(
                Contest::ballot_measure(
                    "_Contest_Tax",
                    "Tax referendum",
                    vec![
                        ContestSelection::ballot_measure("_sel_Tax_Yes", "Yes"),
                        ContestSelection::ballot_measure("_sel_Tax_No", "No"),
                    ],
                ),
                "tax",
            )
            .build()
            .unwrap()
    }

    fn report(rows: &[&[&str]]) -> Result<CastVoteRecordReport, CvrErrors> {
        let catalog = catalog();
        let header: Vec<String> = ["Cast Vote Record", "Governor", "Tax referendum"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows: Vec<Vec<String>> = rows
            .iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect();
        let cvrs = translate_rows(
            &catalog,
            &TranslationRules::default(),
            &header,
            &rows,
            2,
        )?;
        let mut report = CastVoteRecordReport::assemble(&catalog, cvrs, &ReportSettings::default());
        report.generated_date = Some(Utc.with_ymd_and_hms(2018, 11, 6, 20, 0, 0).unwrap());
        Ok(report)
    }

    fn child_texts<'a, 'input>(node: roxmltree::Node<'a, 'input>, name: &str) -> Vec<&'a str> {
        node.children()
            .filter(|n| n.is_element() && n.tag_name().name() == name)
            .map(|n| n.text().unwrap_or(""))
            .collect()
    }

    #[test]
    fn marked_ballot() {
        init();
        let xml = report(&[&["1001", "DEM Tony Evers /Mandela Barnes", "Yes"]])
            .unwrap()
            .to_xml()
            .unwrap();
        let doc = Document::parse(&xml).unwrap();
        let root = doc.root_element();
        assert_eq!(root.tag_name().name(), "CastVoteRecordReport");

        let cvrs: Vec<_> = root
            .children()
            .filter(|n| n.tag_name().name() == "CVR")
            .collect();
        assert_eq!(cvrs.len(), 1);
        assert_eq!(child_texts(cvrs[0], "UniqueId"), vec!["1001"]);
        assert_eq!(child_texts(cvrs[0], "CreatingDeviceId"), vec!["_rpdev_ward9"]);

        let gov = cvrs[0]
            .descendants()
            .find(|n| n.attribute("ObjectId") == Some("_cvr_contest_1001_gov"))
            .unwrap();
        assert_eq!(child_texts(gov, "ContestId"), vec!["_Contest_GOV"]);
        let selections: Vec<_> = gov
            .children()
            .filter(|n| n.tag_name().name() == "CVRContestSelection")
            .collect();
        assert_eq!(selections.len(), 1);
        assert_eq!(
            child_texts(selections[0], "ContestSelectionId"),
            vec!["_sel_GOV_Evers"]
        );
        assert_eq!(child_texts(gov, "Overvotes"), vec!["0"]);
        assert_eq!(child_texts(gov, "Undervotes"), vec!["0"]);
    }

    #[test]
    fn overvoted_ballot() {
        init();
        let xml = report(&[&["1002", "overvote", "undervote"]])
            .unwrap()
            .to_xml()
            .unwrap();
        let doc = Document::parse(&xml).unwrap();
        let gov = doc
            .descendants()
            .find(|n| n.attribute("ObjectId") == Some("_cvr_contest_1002_gov"))
            .unwrap();
        assert_eq!(child_texts(gov, "Overvotes"), vec!["1"]);
        assert!(child_texts(gov, "CVRContestSelection").is_empty());
        let tax = doc
            .descendants()
            .find(|n| n.attribute("ObjectId") == Some("_cvr_contest_1002_tax"))
            .unwrap();
        assert_eq!(child_texts(tax, "Undervotes"), vec!["1"]);
    }

    #[test]
    fn unknown_value_produces_nothing() {
        let res = report(&[
            &["1001", "DEM Tony Evers /Mandela Barnes", "Yes"],
            &["1003", "Nobody", "No"],
        ]);
        let err = res.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("1003"));
        assert!(msg.contains("Governor"));
        assert!(msg.contains("Nobody"));
    }

    #[test]
    fn root_layout() {
        let report = CastVoteRecordReport {
            notes: Some("Ward 9 test".to_string()),
            ..report(&[&["1001", "write-in:", "No"]]).unwrap()
        };
        let xml = report.to_xml().unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<CastVoteRecordReport xmlns=\"NIST_V0_cast_vote_records.xsd\" xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">\n  <CVR ObjectId=\"_cvr_1001\">\n"));
        assert!(xml.contains("  <GeneratedDate>2018-11-06T20:00:00Z</GeneratedDate>\n"));
        assert!(xml.contains("<WriteIns>1</WriteIns>"));

        let doc = Document::parse(&xml).unwrap();
        let sections: Vec<&str> = doc
            .root_element()
            .children()
            .filter(|n| n.is_element())
            .map(|n| n.tag_name().name())
            .collect();
        assert_eq!(
            sections,
            vec![
                "CVR",
                "Election",
                "GeneratedDate",
                "GpUnit",
                "Notes",
                "Party",
                "Party",
                "ReportGeneratingDeviceIds",
                "ReportingDevice",
                "Version"
            ]
        );
        let election = doc
            .root_element()
            .children()
            .find(|n| n.tag_name().name() == "Election")
            .unwrap();
        let contests: Vec<&str> = election
            .children()
            .filter(|n| n.tag_name().name() == "Contest")
            .filter_map(|n| n.attribute("ObjectId"))
            .collect();
        assert_eq!(contests, vec!["_Contest_GOV", "_Contest_Tax"]);
        assert_eq!(child_texts(doc.root_element(), "Version"), vec!["1.0.0"]);
    }

    #[test]
    fn deterministic_output() {
        let rows: &[&[&str]] = &[
            &["1001", "DEM Tony Evers /Mandela Barnes", "Yes"],
            &["1002", "overvote", "No"],
        ];
        let a = report(rows).unwrap().to_xml().unwrap();
        let b = report(rows).unwrap().to_xml().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn output_passes_the_checker() {
        let report = report(&[
            &["1001", "DEM Tony Evers /Mandela Barnes", "Yes"],
            &["1002", "overvote", "No"],
            &["1003", "write-in:", "undervote"],
            &["1004", "REP Scott Walker /Rebecca Kleefisch", "No"],
        ])
        .unwrap();
        let xml = report.to_xml().unwrap();
        let checked = check_document(&xml);
        assert!(checked.is_valid(), "{:?}", checked.problems);

        let broken = xml.replacen("      <Type>original</Type>\n", "", 1);
        let checked = check_document(&broken);
        assert!(!checked.is_valid());
        assert!(matches!(
            checked.problems.as_slice(),
            [CheckProblem::MissingChild { child, .. }] if child == "Type"
        ));
    }

    #[test]
    fn cvrs_keep_the_row_order() {
        let report = report(&[
            &["30", "undervote", "No"],
            &["10", "undervote", "No"],
            &["20", "undervote", "No"],
        ])
        .unwrap();
        let ids: Vec<&str> = report.cvrs.iter().map(|c| c.unique_id.as_str()).collect();
        assert_eq!(ids, vec!["30", "10", "20"]);
        for cvr in report.cvrs.iter() {
            for contest in cvr.snapshots[0].contests.iter() {
                assert!(contest.selections.is_empty() || contest.overvotes + contest.undervotes == 0);
            }
        }
    }

    #[test]
    fn integrity_violations_are_rejected() {
        let base = report(&[&["1001", "DEM Tony Evers /Mandela Barnes", "Yes"]]).unwrap();

        let mut r = base.clone();
        r.cvrs[0].snapshots.clear();
        assert_eq!(
            r.to_xml(),
            Err(CvrErrors::EmptySnapshots {
                cvr_id: "_cvr_1001".to_string()
            })
        );

        let mut r = base.clone();
        r.cvrs[0].snapshots[0].contests[0].overvotes = 1;
        assert_eq!(
            r.to_xml(),
            Err(CvrErrors::InconsistentOutcome {
                cvr_contest_id: "_cvr_contest_1001_gov".to_string()
            })
        );

        let mut r = base.clone();
        r.cvrs[0].snapshots[0].contests[0].selections[0].contest_selection_id =
            "_sel_Tax_No".to_string();
        assert_eq!(
            r.to_xml(),
            Err(CvrErrors::SelectionOutsideContest {
                cvr_contest_id: "_cvr_contest_1001_gov".to_string(),
                selection_id: "_sel_Tax_No".to_string()
            })
        );

        let mut r = base.clone();
        r.cvrs[0].snapshots[0].contests[0].contest_id = "_Contest_AG".to_string();
        assert!(matches!(
            r.to_xml(),
            Err(CvrErrors::UndeclaredReference { reference, .. }) if reference == "_Contest_AG"
        ));

        let mut r = base.clone();
        r.cvrs.push(base.cvrs[0].clone());
        assert_eq!(
            r.to_xml(),
            Err(CvrErrors::DuplicateId {
                id: "_cvr_1001".to_string()
            })
        );
    }

    #[test]
    fn missing_date_is_stamped() {
        let r = CastVoteRecordReport {
            generated_date: None,
            ..report(&[]).unwrap()
        };
        let xml = r.to_xml().unwrap();
        assert!(xml.contains("<GeneratedDate>"));
        assert!(r.generated_date.is_none());
        assert!(check_document(&xml).is_valid());
    }
}

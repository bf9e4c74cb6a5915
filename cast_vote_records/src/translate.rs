use log::{debug, info};

use crate::builder::{Catalog, ContestEntry};
use crate::model::*;

/// How the cells of a ballot table are read.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TranslationRules {
    /// The header of the column holding the ballot identifiers.
    pub id_column: String,
    pub overvote_label: String,
    pub undervote_label: String,
    pub treat_blank_as_undervote: bool,
}

impl TranslationRules {
    pub const DEFAULT_ID_COLUMN: &'static str = "Cast Vote Record";
    pub const DEFAULT_OVERVOTE_LABEL: &'static str = "overvote";
    pub const DEFAULT_UNDERVOTE_LABEL: &'static str = "undervote";
}

impl Default for TranslationRules {
    fn default() -> Self {
        TranslationRules {
            id_column: TranslationRules::DEFAULT_ID_COLUMN.to_string(),
            overvote_label: TranslationRules::DEFAULT_OVERVOTE_LABEL.to_string(),
            undervote_label: TranslationRules::DEFAULT_UNDERVOTE_LABEL.to_string(),
            treat_blank_as_undervote: false,
        }
    }
}

// What a cell says about a contest.
#[derive(Eq, PartialEq, Debug, Clone)]
enum CellChoice<'a> {
    Selection(&'a ContestSelection),
    Overvote,
    Undervote,
}

/// Turns the rows of a ballot table into CVRs.
///
/// It is bound to the header of the table: every contest of the catalog must
/// have its own column, named after the contest. Other columns are ignored.
#[derive(Debug, Clone)]
pub struct RowTranslator<'a> {
    catalog: &'a Catalog,
    rules: &'a TranslationRules,
    id_idx: usize,
    // One column per contest, in catalog order.
    columns: Vec<(ContestEntry<'a>, usize)>,
}

impl<'a> RowTranslator<'a> {
    pub fn new(
        catalog: &'a Catalog,
        rules: &'a TranslationRules,
        header: &[String],
    ) -> Result<RowTranslator<'a>, CvrErrors> {
        let position = |name: &str| -> Result<usize, CvrErrors> {
            header
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| CvrErrors::MissingColumn {
                    column: name.to_string(),
                })
        };

        let id_idx = position(rules.id_column.as_str())?;
        let mut columns = Vec::new();
        for entry in catalog.contests() {
            let idx = position(entry.contest.name.as_str())?;
            columns.push((entry, idx));
        }

        for h in header.iter() {
            if *h != rules.id_column && catalog.contest_by_name(h).is_none() {
                debug!("RowTranslator: ignoring column {:?}", h);
            }
        }

        Ok(RowTranslator {
            catalog,
            rules,
            id_idx,
            columns,
        })
    }

    fn read_cell(
        &self,
        entry: &ContestEntry<'a>,
        ballot_id: &str,
        cell: &str,
    ) -> Result<CellChoice<'a>, CvrErrors> {
        let value = cell.trim();
        if value == self.rules.overvote_label {
            return Ok(CellChoice::Overvote);
        }
        if value == self.rules.undervote_label
            || (value.is_empty() && self.rules.treat_blank_as_undervote)
        {
            return Ok(CellChoice::Undervote);
        }
        entry
            .lookup(value)
            .map(CellChoice::Selection)
            .ok_or_else(|| CvrErrors::UnrecognizedValue {
                ballot_id: ballot_id.to_string(),
                contest: entry.contest.name.clone(),
                value: value.to_string(),
            })
    }

    /// Translates one row. `lineno` only serves the error messages.
    pub fn translate(&self, lineno: usize, row: &[String]) -> Result<Cvr, CvrErrors> {
        let cell = |idx: usize| {
            row.get(idx).ok_or_else(|| CvrErrors::ShortRow {
                lineno,
                expected: idx + 1,
                found: row.len(),
            })
        };

        let ballot_id = cell(self.id_idx)?.trim();
        if ballot_id.is_empty() {
            return Err(CvrErrors::EmptyBallotId { lineno });
        }
        if !is_id_fragment(ballot_id) {
            return Err(CvrErrors::InvalidBallotId {
                lineno,
                ballot_id: ballot_id.to_string(),
            });
        }

        let mut contests: Vec<CvrContest> = Vec::with_capacity(self.columns.len());
        for (entry, idx) in self.columns.iter() {
            let contest_id = entry.contest.id.as_str();
            let cvr_contest_id = format!("_cvr_contest_{}_{}", ballot_id, entry.short_code);
            let choice = self.read_cell(entry, ballot_id, cell(*idx)?)?;
            let cvr_contest = match choice {
                CellChoice::Overvote => CvrContest::overvote(&cvr_contest_id, contest_id),
                CellChoice::Undervote => CvrContest::undervote(&cvr_contest_id, contest_id),
                CellChoice::Selection(sel) => {
                    let cvr_sel = CvrContestSelection::new(
                        &format!("_cvr{}_cs_{}", ballot_id, entry.short_code),
                        &sel.id,
                    );
                    let c = CvrContest::marked(&cvr_contest_id, contest_id, vec![cvr_sel]);
                    if sel.is_write_in() {
                        c.with_write_ins(1)
                    } else {
                        c
                    }
                }
            };
            contests.push(cvr_contest);
        }
        debug!(
            "translate: line {} ballot {:?}: {} contests",
            lineno,
            ballot_id,
            contests.len()
        );

        let snapshot = CvrSnapshot::original(&format!("_cvr_snapshot_{}_001", ballot_id), contests);
        Ok(Cvr {
            id: format!("_cvr_{}", ballot_id),
            unique_id: ballot_id.to_string(),
            election_id: self.catalog.election().id.clone(),
            snapshots: vec![snapshot],
            creating_device_id: Some(self.catalog.reporting_device().id.clone()),
            ballot_pre_printed_id: None,
        })
    }
}

// The ballot id becomes part of ObjectIds, which are XML names.
fn is_id_fragment(ballot_id: &str) -> bool {
    ballot_id
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '.' | '_'))
}

/// Translates all the rows of a table, in order.
///
/// `first_lineno` is the line number of the first row in the source file.
/// The first failing row stops the translation.
pub fn translate_rows(
    catalog: &Catalog,
    rules: &TranslationRules,
    header: &[String],
    rows: &[Vec<String>],
    first_lineno: usize,
) -> Result<Vec<Cvr>, CvrErrors> {
    let translator = RowTranslator::new(catalog, rules, header)?;
    let cvrs = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| translator.translate(first_lineno + idx, row))
        .collect::<Result<Vec<Cvr>, CvrErrors>>()?;
    info!("Translated {} ballots", cvrs.len());
    Ok(cvrs)
}

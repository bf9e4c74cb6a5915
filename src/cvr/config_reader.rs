use crate::cvr::*;

use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CodeConfig {
    #[serde(rename = "type")]
    pub code_type: String,
    pub value: String,
    pub label: Option<String>,
    #[serde(rename = "otherType")]
    pub other_type: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionConfig {
    pub id: String,
    pub name: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct GpUnitConfig {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub unit_type: String,
    pub code: Option<CodeConfig>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ReportingDeviceConfig {
    pub id: String,
    pub model: Option<String>,
    pub notes: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct PartyConfig {
    pub id: String,
    pub abbreviation: String,
    pub name: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CandidateConfig {
    pub id: String,
    pub name: String,
    #[serde(rename = "partyId")]
    pub party_id: Option<String>,
    pub code: Option<CodeConfig>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    pub id: String,
    // Candidate contests
    #[serde(rename = "candidateId")]
    pub candidate_id: Option<String>,
    #[serde(rename = "isWriteIn")]
    pub is_write_in: Option<bool>,
    // Ballot measures
    pub selection: Option<String>,
    pub code: Option<CodeConfig>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ContestConfig {
    /// "candidate" or "ballotMeasure"
    #[serde(rename = "type")]
    pub contest_type: String,
    pub id: String,
    pub name: String,
    #[serde(rename = "shortCode")]
    pub short_code: String,
    pub abbreviation: Option<String>,
    #[serde(rename = "voteVariation")]
    pub vote_variation: Option<String>,
    #[serde(rename = "otherVoteVariation")]
    pub other_vote_variation: Option<String>,
    #[serde(rename = "numberElected")]
    pub number_elected: Option<u32>,
    #[serde(rename = "votesAllowed")]
    pub votes_allowed: Option<u32>,
    #[serde(rename = "primaryPartyId")]
    pub primary_party_id: Option<String>,
    pub code: Option<CodeConfig>,
    pub selections: Vec<SelectionConfig>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    pub provider: Option<String>,
    #[serde(rename = "idColumn")]
    pub id_column: Option<String>,
    #[serde(rename = "overvoteLabel")]
    pub overvote_label: Option<String>,
    #[serde(rename = "undervoteLabel")]
    pub undervote_label: Option<String>,
    #[serde(rename = "treatBlankAsUndervote")]
    pub treat_blank_as_undervote: Option<bool>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub version: Option<String>,
    pub notes: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CvrConfig {
    pub election: ElectionConfig,
    pub scope: GpUnitConfig,
    #[serde(rename = "reportingDevice")]
    pub reporting_device: ReportingDeviceConfig,
    #[serde(default)]
    pub parties: Vec<PartyConfig>,
    #[serde(default)]
    pub candidates: Vec<CandidateConfig>,
    #[serde(default)]
    pub contests: Vec<ContestConfig>,
    pub input: Option<InputConfig>,
    pub report: Option<ReportConfig>,
}

impl CodeConfig {
    pub fn to_code(&self) -> CvrResult<Code> {
        let code_type = match IdentifierType::parse(&self.code_type) {
            Some(t) => t,
            None => whatever!("unknown code type: {:?}", self.code_type),
        };
        Ok(Code {
            code_type,
            value: self.value.clone(),
            label: self.label.clone(),
            other_type: self.other_type.clone(),
        })
    }
}

fn read_code(code: &Option<CodeConfig>) -> CvrResult<Option<Code>> {
    code.as_ref().map(|c| c.to_code()).transpose()
}

impl GpUnitConfig {
    pub fn to_gp_unit(&self) -> CvrResult<GpUnit> {
        let unit_type = match ReportingUnitType::parse(&self.unit_type) {
            Some(t) => t,
            None => whatever!(
                "unknown reporting unit type {:?} for {}",
                self.unit_type,
                self.id
            ),
        };
        Ok(GpUnit {
            code: read_code(&self.code)?,
            ..GpUnit::new(&self.id, &self.name, unit_type)
        })
    }
}

impl CandidateConfig {
    pub fn to_candidate(&self) -> CvrResult<Candidate> {
        Ok(Candidate {
            code: read_code(&self.code)?,
            ..Candidate::new(&self.id, &self.name, self.party_id.as_deref())
        })
    }
}

impl ContestConfig {
    fn candidate_selection(&self, sel: &SelectionConfig) -> CvrResult<ContestSelection> {
        let candidate_id = match &sel.candidate_id {
            Some(c) => c,
            None => whatever!(
                "selection {} of contest {} has no candidateId",
                sel.id,
                self.id
            ),
        };
        let base = if sel.is_write_in.unwrap_or(false) {
            ContestSelection::write_in(&sel.id, candidate_id)
        } else {
            ContestSelection::candidate(&sel.id, candidate_id)
        };
        Ok(ContestSelection {
            code: read_code(&sel.code)?,
            ..base
        })
    }

    fn ballot_measure_selection(&self, sel: &SelectionConfig) -> CvrResult<ContestSelection> {
        let selection = match &sel.selection {
            Some(s) => s,
            None => whatever!(
                "selection {} of contest {} has no selection text",
                sel.id,
                self.id
            ),
        };
        Ok(ContestSelection {
            code: read_code(&sel.code)?,
            ..ContestSelection::ballot_measure(&sel.id, selection)
        })
    }

    pub fn to_contest(&self) -> CvrResult<Contest> {
        let base = match self.contest_type.as_str() {
            "candidate" => {
                let selections = self
                    .selections
                    .iter()
                    .map(|s| self.candidate_selection(s))
                    .collect::<CvrResult<Vec<ContestSelection>>>()?;
                Contest {
                    kind: ContestKind::Candidate {
                        number_elected: self.number_elected.unwrap_or(1),
                        votes_allowed: self.votes_allowed.unwrap_or(1),
                        primary_party_id: self.primary_party_id.clone(),
                    },
                    ..Contest::candidate(&self.id, &self.name, selections)
                }
            }
            "ballotMeasure" => {
                let selections = self
                    .selections
                    .iter()
                    .map(|s| self.ballot_measure_selection(s))
                    .collect::<CvrResult<Vec<ContestSelection>>>()?;
                Contest::ballot_measure(&self.id, &self.name, selections)
            }
            x => whatever!("unknown contest type {:?} for contest {}", x, self.id),
        };

        let vote_variation = match &self.vote_variation {
            Some(v) => match VoteVariation::parse(v) {
                Some(vv) => Some(vv),
                None => whatever!("unknown vote variation {:?} for contest {}", v, self.id),
            },
            None => None,
        };

        Ok(Contest {
            abbreviation: self.abbreviation.clone(),
            code: read_code(&self.code)?,
            vote_variation,
            other_vote_variation: self.other_vote_variation.clone(),
            ..base
        })
    }
}

pub fn read_config(path: &str) -> CvrResult<CvrConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: CvrConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn build_catalog(config: &CvrConfig) -> CvrResult<Catalog> {
    let mut builder = CatalogBuilder::new(&config.election.id, &config.election.name)
        .scope(config.scope.to_gp_unit()?)
        .reporting_device(ReportingDevice {
            model: config.reporting_device.model.clone(),
            notes: config.reporting_device.notes.clone(),
            ..ReportingDevice::new(&config.reporting_device.id)
        });
    for p in config.parties.iter() {
        builder = builder.party(Party::new(&p.id, &p.abbreviation, &p.name));
    }
    for c in config.candidates.iter() {
        builder = builder.candidate(c.to_candidate()?);
    }
    for c in config.contests.iter() {
        builder = builder.contest(c.to_contest()?, &c.short_code);
    }
    builder.build().context(ConversionSnafu {})
}

pub fn translation_rules(input: Option<&InputConfig>) -> TranslationRules {
    let defaults = TranslationRules::default();
    match input {
        None => defaults,
        Some(i) => TranslationRules {
            id_column: i.id_column.clone().unwrap_or(defaults.id_column),
            overvote_label: i.overvote_label.clone().unwrap_or(defaults.overvote_label),
            undervote_label: i
                .undervote_label
                .clone()
                .unwrap_or(defaults.undervote_label),
            treat_blank_as_undervote: i
                .treat_blank_as_undervote
                .unwrap_or(defaults.treat_blank_as_undervote),
        },
    }
}

pub fn report_settings(config: &CvrConfig) -> ReportSettings {
    let defaults = ReportSettings::default();
    match &config.report {
        None => defaults,
        Some(r) => ReportSettings {
            version: r.version.clone().unwrap_or(defaults.version),
            notes: r.notes.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_config() -> CvrConfig {
        read_config(&format!(
            "{}/demos/fall2018_ward9.json",
            env!("CARGO_MANIFEST_DIR")
        ))
        .unwrap()
    }

    #[test]
    fn demo_catalog() {
        let config = demo_config();
        let catalog = build_catalog(&config).unwrap();
        assert_eq!(catalog.election().id, "_fall_2018_madison_ward_9");
        assert_eq!(catalog.parties().len(), 6);
        assert_eq!(
            catalog.scope().code,
            Some(Code::new(IdentifierType::LocalLevel, "City of Madison Ward 9"))
        );
        assert_eq!(catalog.reporting_device().model.as_deref(), Some("ESS DS200"));

        let gov = catalog
            .contest_by_name("Governor / Lieutenant Governor")
            .unwrap();
        assert_eq!(gov.short_code, "gov");
        assert_eq!(gov.contest.vote_variation, Some(VoteVariation::NOfM));
        assert!(gov.lookup("write-in:").unwrap().is_write_in());
        let weed = catalog
            .contest_by_name("County Referendum re: legalize marijuana")
            .unwrap();
        assert_eq!(weed.lookup("No").unwrap().id, "_sel_weed_no");
        assert_eq!(weed.contest.kind, ContestKind::BallotMeasure);
    }

    #[test]
    fn rules_and_settings() {
        let config = demo_config();
        let rules = translation_rules(config.input.as_ref());
        assert_eq!(rules, TranslationRules::default());
        let settings = report_settings(&config);
        assert_eq!(settings.version, "1.0.0");
        assert!(settings.notes.is_some());

        let input = InputConfig {
            file_path: None,
            provider: None,
            id_column: Some("Ballot".to_string()),
            overvote_label: Some("OV".to_string()),
            undervote_label: None,
            treat_blank_as_undervote: Some(true),
            excel_worksheet_name: None,
        };
        let rules = translation_rules(Some(&input));
        assert_eq!(rules.id_column, "Ballot");
        assert_eq!(rules.overvote_label, "OV");
        assert_eq!(rules.undervote_label, "undervote");
        assert!(rules.treat_blank_as_undervote);
    }

    #[test]
    fn candidate_contest_fields() {
        let js = r#"{
            "type": "candidate", "id": "_Contest_AG", "name": "Attorney General",
            "shortCode": "ag", "numberElected": 2, "votesAllowed": 2, "primaryPartyId": "_Dem",
            "selections": [
                { "id": "_sel_ag_kaul", "candidateId": "_ag_kaul",
                  "code": { "type": "other", "otherType": "ballot-position", "value": "2" } }
            ]
        }"#;
        let config: ContestConfig = serde_json::from_str(js).unwrap();
        let contest = config.to_contest().unwrap();
        assert_eq!(
            contest.kind,
            ContestKind::Candidate {
                number_elected: 2,
                votes_allowed: 2,
                primary_party_id: Some("_Dem".to_string())
            }
        );
        let code = contest.selections[0].code.clone().unwrap();
        assert_eq!(code.code_type, IdentifierType::Other);
        assert_eq!(code.other_type.as_deref(), Some("ballot-position"));
    }

    #[test]
    fn invalid_entries() {
        let js = r#"{ "type": "office", "id": "_c", "name": "C", "shortCode": "c", "selections": [] }"#;
        let config: ContestConfig = serde_json::from_str(js).unwrap();
        assert!(matches!(config.to_contest(), Err(CvrError::Whatever { .. })));

        let js = r#"{ "type": "ballotMeasure", "id": "_c", "name": "C", "shortCode": "c",
                      "selections": [ { "id": "_s", "candidateId": "_x" } ] }"#;
        let config: ContestConfig = serde_json::from_str(js).unwrap();
        assert!(config.to_contest().is_err());

        let code = CodeConfig {
            code_type: "oci-id".to_string(),
            value: "x".to_string(),
            label: None,
            other_type: None,
        };
        assert!(code.to_code().is_err());
    }

    #[test]
    fn catalog_errors_are_reported() {
        let mut config = demo_config();
        config.candidates[0].party_id = Some("_Reform".to_string());
        assert!(matches!(
            build_catalog(&config),
            Err(CvrError::Conversion {
                source: CvrErrors::UndeclaredReference { .. }
            })
        ));
    }
}

// Rendering of each entity to its XML element.
// The child order of every element follows the sequences of the CVR schema.

use crate::model::*;
use crate::xml::Element;

const XSI_TYPE: &str = "xsi:type";

pub(crate) fn code_element(code: &Code) -> Element {
    Element::new("Code")
        .opt_text_child("Label", code.label.as_deref())
        .opt_text_child("OtherType", code.other_type.as_deref())
        .text_child("Type", code.code_type.as_str())
        .text_child("Value", &code.value)
}

pub(crate) fn party_element(party: &Party) -> Element {
    Element::new("Party")
        .attr("ObjectId", &party.id)
        .text_child("Abbreviation", &party.abbreviation)
        .text_child("Name", &party.name)
}

pub(crate) fn candidate_element(candidate: &Candidate) -> Element {
    Element::new("Candidate")
        .attr("ObjectId", &candidate.id)
        .opt_child(candidate.code.as_ref().map(code_element))
        .text_child("Name", &candidate.name)
        .opt_text_child("PartyId", candidate.party_id.as_deref())
}

pub(crate) fn contest_selection_element(selection: &ContestSelection) -> Element {
    let base = Element::new("ContestSelection").attr("ObjectId", &selection.id);
    match &selection.kind {
        SelectionKind::Candidate {
            candidate_id,
            is_write_in,
        } => base
            .attr(XSI_TYPE, "CandidateSelection")
            .opt_child(selection.code.as_ref().map(code_element))
            .text_child("CandidateIds", candidate_id)
            .opt_text_child("IsWriteIn", is_write_in.then_some("true")),
        SelectionKind::BallotMeasure { selection: label } => base
            .attr(XSI_TYPE, "BallotMeasureSelection")
            .opt_child(selection.code.as_ref().map(code_element))
            .text_child("Selection", label),
    }
}

pub(crate) fn contest_element(contest: &Contest) -> Element {
    let xsi_type = match contest.kind {
        ContestKind::Candidate { .. } => "CandidateContest",
        ContestKind::BallotMeasure => "BallotMeasureContest",
    };
    let base = Element::new("Contest")
        .attr("ObjectId", &contest.id)
        .attr(XSI_TYPE, xsi_type)
        .opt_text_child("Abbreviation", contest.abbreviation.as_deref())
        .opt_child(contest.code.as_ref().map(code_element))
        .children(contest.selections.iter().map(contest_selection_element))
        .text_child("Name", &contest.name)
        .opt_text_child("OtherVoteVariation", contest.other_vote_variation.as_deref())
        .opt_text_child("VoteVariation", contest.vote_variation.map(|v| v.as_str()));
    match &contest.kind {
        ContestKind::Candidate {
            number_elected,
            votes_allowed,
            primary_party_id,
        } => base
            .text_child("NumberElected", &number_elected.to_string())
            .opt_text_child("PrimaryPartyId", primary_party_id.as_deref())
            .text_child("VotesAllowed", &votes_allowed.to_string()),
        ContestKind::BallotMeasure => base,
    }
}

pub(crate) fn gp_unit_element(gp_unit: &GpUnit) -> Element {
    Element::new("GpUnit")
        .attr("ObjectId", &gp_unit.id)
        .opt_child(gp_unit.code.as_ref().map(code_element))
        .text_child("Name", &gp_unit.name)
        .text_child("Type", gp_unit.unit_type.as_str())
}

pub(crate) fn reporting_device_element(device: &ReportingDevice) -> Element {
    Element::new("ReportingDevice")
        .attr("ObjectId", &device.id)
        .opt_text_child("Model", device.model.as_deref())
        .opt_text_child("Notes", device.notes.as_deref())
}

pub(crate) fn election_element(election: &Election) -> Element {
    Element::new("Election")
        .attr("ObjectId", &election.id)
        .children(election.candidates.iter().map(candidate_element))
        .children(election.contests.iter().map(contest_element))
        .text_child("ElectionScopeId", &election.scope_id)
        .text_child("Name", &election.name)
}

pub(crate) fn cvr_contest_selection_element(selection: &CvrContestSelection) -> Element {
    let position = Element::new("SelectionPosition")
        .text_child("HasIndication", selection.position.has_indication.as_str())
        .text_child("IsAllocable", selection.position.is_allocable.as_str())
        .text_child("NumberVotes", &selection.position.number_votes.to_string());
    Element::new("CVRContestSelection")
        .attr("ObjectId", &selection.id)
        .text_child("ContestSelectionId", &selection.contest_selection_id)
        .child(position)
        .text_child("TotalNumberVotes", &selection.total_number_votes.to_string())
}

pub(crate) fn cvr_contest_element(contest: &CvrContest) -> Element {
    Element::new("CVRContest")
        .attr("ObjectId", &contest.id)
        .text_child("ContestId", &contest.contest_id)
        .children(contest.selections.iter().map(cvr_contest_selection_element))
        .text_child("Overvotes", &contest.overvotes.to_string())
        .text_child("Undervotes", &contest.undervotes.to_string())
        .text_child("WriteIns", &contest.write_ins.to_string())
}

pub(crate) fn cvr_snapshot_element(snapshot: &CvrSnapshot) -> Element {
    Element::new("CVRSnapshot")
        .attr("ObjectId", &snapshot.id)
        .children(snapshot.contests.iter().map(cvr_contest_element))
        .text_child("Type", snapshot.snapshot_type.as_str())
}

pub(crate) fn cvr_element(cvr: &Cvr) -> Result<Element, CvrErrors> {
    let current = cvr.current_snapshot().ok_or_else(|| CvrErrors::EmptySnapshots {
        cvr_id: cvr.id.clone(),
    })?;
    Ok(Element::new("CVR")
        .attr("ObjectId", &cvr.id)
        .opt_text_child("BallotPrePrintedId", cvr.ballot_pre_printed_id.as_deref())
        .opt_text_child("CreatingDeviceId", cvr.creating_device_id.as_deref())
        .text_child("CurrentSnapshotId", &current.id)
        .children(cvr.snapshots.iter().map(cvr_snapshot_element))
        .text_child("ElectionId", &cvr.election_id)
        .text_child("UniqueId", &cvr.unique_id))
}

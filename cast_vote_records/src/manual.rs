/*!

This is the long-form manual for `cast_vote_records` and `cvrconv`.

`cvrconv` reads a table of ballots (one row per ballot, one column per contest)
and writes a cast vote records report in the NIST CVR XML format.

## Input formats

The following formats are supported:
* `csv` Comma Separated Values
* `xlsx` Excel spreadsheets, as exported by ES&S tabulators

In both cases the first row is the header. One column holds the ballot
identifiers (`Cast Vote Record` by default) and each contest of the catalog
must have a column with exactly the name of the contest. The readers strip
the spaces around header cells, nothing else. Other columns are ignored.

Ballot identifiers become part of the XML identifiers of the report, so they
may only contain letters, digits, `-`, `.` and `_`.

```text
Cast Vote Record,Precinct,Governor,Tax referendum
1001,Ward 9,DEM Tony Evers /Mandela Barnes,Yes
1002,Ward 9,overvote,No
1003,Ward 9,write-in:,undervote
```

Each cell is either:
- the label of a selection: the name of the candidate for candidate contests,
  the response (`Yes`, `No`, ...) for ballot measures,
- the overvote marker (`overvote` by default),
- the undervote marker (`undervote` by default).

Any other value stops the conversion with an error naming the ballot, the
contest and the value. Blank cells are errors too, unless
`treatBlankAsUndervote` is set.

### `xlsx`

The first worksheet is read, unless `excelWorksheetName` is set.

## Configuration

The election is described in a JSON file, the catalog. All the identifiers
(the `id` fields) become `ObjectId` attributes of the report and must be
unique across the catalog.

```json
{
  "election": { "id": "_fall_2018_madison_ward_9", "name": "Fall 2018 Ward 9" },
  "scope": {
    "id": "_cvr_gp", "name": "Ward 9", "type": "precinct",
    "code": { "type": "local-level", "value": "City of Madison Ward 9" }
  },
  "reportingDevice": { "id": "_rpdev_ward9", "model": "ESS DS200" },
  "parties": [ { "id": "_Dem", "abbreviation": "DEM", "name": "Democratic" } ],
  "candidates": [
    { "id": "_GOV_Evers", "name": "DEM Tony Evers /Mandela Barnes", "partyId": "_Dem" },
    { "id": "_GOV_WI", "name": "write-in:" }
  ],
  "contests": [
    {
      "type": "candidate", "id": "_Contest_GOV", "name": "Governor",
      "shortCode": "gov", "voteVariation": "n-of-m",
      "selections": [
        { "id": "_sel_GOV_Evers", "candidateId": "_GOV_Evers" },
        { "id": "_sel_GOV_WI", "candidateId": "_GOV_WI", "isWriteIn": true }
      ]
    },
    {
      "type": "ballotMeasure", "id": "_Contest_Tax", "name": "Tax referendum",
      "shortCode": "tax",
      "selections": [
        { "id": "_sel_Tax_Yes", "selection": "Yes" },
        { "id": "_sel_Tax_No", "selection": "No" }
      ]
    }
  ],
  "input": { "filePath": "ward9.csv", "provider": "csv" },
  "report": { "version": "1.0.0", "notes": "Fall 2018, Ward 9" }
}
```

Sections:
- `election` (required): `id`, `name`.
- `scope` (required): the reporting unit. `type` is `precinct` or
  `combined-precinct`.
- `reportingDevice` (required): `id`, optional `model` and `notes`.
- `parties`, `candidates`: optional lists. `partyId` is optional.
- `contests`: tagged by `type`. Candidate contests accept `numberElected`
  and `votesAllowed` (both 1 by default) and `primaryPartyId`. At most one
  selection per contest may be a write-in. The `shortCode` is used to build
  the identifiers of the per-ballot records and must be unique.
- `input`: `filePath` (relative paths are resolved against the directory of
  the catalog), `provider` (`csv` or `xlsx`), `idColumn`, `overvoteLabel`,
  `undervoteLabel`, `treatBlankAsUndervote`, `excelWorksheetName`.
- `report`: `version` (`1.0.0` by default), `notes`.

`code` fields take a `type` (`fips`, `local-level`, `national-level`,
`ocd-id`, `state-level`, `other`), a `value` and optionally a `label` and an
`otherType`.

## Identifiers of the ballot records

For a ballot `B` and a contest of short code `S`:
* the CVR is `_cvr_B`
* its only snapshot is `_cvr_snapshot_B_001`
* the contest outcome is `_cvr_contest_B_S`
* the marked selection is `_cvrB_cs_S`

## Command line

```bash
cvrconv -c catalog.json -o report.xml
cvrconv -c catalog.json --limit 10
cvrconv -c catalog.json -r expected.xml
cvrconv --check report.xml
```

`--reference` compares the output with an existing report, ignoring the
`GeneratedDate` line. `--check` only reads a report and lists its structural
problems (unknown or missing sections, missing elements, references to
undefined identifiers). It does not validate against the XSD schema.

 */

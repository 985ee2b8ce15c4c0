/*!

This is the long-form manual for `sighting_fold` and `survey_processor`.

## Input

A survey is a spreadsheet with one sheet per season or per site. Each row of a
sheet is one sighting of a tagged animal (a pup). The first row is a header and
is not read. By default the columns are:

| column | content |
|--------|---------|
| A | beach |
| B | pup id. The background colour of the cell is carried to the output. |
| C | date of the sighting, `dd/mm/yy` |
| D | julian day of the sighting |
| E | age class, free text: the first digit is the class (`"2B"` is class 2) |

All the column positions and the first data row can be changed in a configuration file.

The following inputs are supported:
* `excel` any workbook that `calamine` can read (`.xls`, `.xlsx`, `.xlsm`, `.ods`)
* `csv` a comma-separated file, which is treated as a workbook with a single sheet
named after the file

Neither reader sees cell colours. When the colour matters, put the palette index
of the colour in a column of its own and declare it with `colourColumnIndex`.

### Dates

Dates have two-digit years. They are read as years of the 2000s, and any year after
2025 is moved back to the 1900s: `01/01/26` is the 1st of January 1926. Cells typed
as dates in the workbook are converted to `dd/mm/yy` first and follow the same rule.

## Processing

The rows of a sheet are read top to bottom. For each pup, the output keeps:
* the beach and the colour of the last row that mentions it,
* for every age class from 0 to 5, the earliest date at which the pup was seen in
this class, with the julian day of the same row.

A later row only replaces a date if it is strictly earlier. A row whose age class
has no digit only updates the beach and the colour.

### Errors

A row with a blank pup id is skipped, and so is a row cut short before its beach,
age class or date (a short CSV line). Skipped rows are only shown with `--verbose`.
Other blank cells are values: a blank age class only updates the beach, a blank beach
is kept as it is, and a blank date next to an age class is an error.

Two errors stop the processing of a sheet:
* an age class greater than 5,
* a date that does not follow `dd/mm/yy` or does not exist (`31/04/10`).

The message gives the sheet, the row number as displayed by the spreadsheet program,
and the column to fix. Nothing is written for the sheet. With `--abort-scope sheet`
(the default), the other sheets are still processed; with `--abort-scope process`,
the run stops. The program exits with status 2 when a sheet was abandoned, and 1 when
the run stopped.

## Output

One table per sheet, written as `<sheet>_result.csv` or `<sheet>_result.json`:

| Beach | Pup ID | C0 | C1 | C2 | C3 | C4 | C5 | C0 | C1 | C2 | C3 | C4 | C5 |
|-------|--------|----|----|----|----|----|----|----|----|----|----|----|----|

The first group of age classes holds the dates (`yyyy-mm-dd`), the second group the
julian days. Pups are sorted by id, numeric ids first.

The JSON form also carries the fill of the id cells:

```json
{
  "sheet": "2014",
  "header": ["Beach", "Pup ID", "C0", "..."],
  "rows": [
    { "cells": ["North", 17, "2014-10-02", "..."], "idFill": { "index": 10, "name": "red", "rgb": "#FF0000" }, "idBorder": { "style": "thin", "colour": "grey 25%" } }
  ]
}
```

## Configuration file

```json
{
  "inputFile": "survey.xls",
  "inputType": "excel",
  "sheets": ["2013", "2014"],
  "firstDataRowIndex": 1,
  "beachColumnIndex": "A",
  "idColumnIndex": "B",
  "dateColumnIndex": "C",
  "julianColumnIndex": "D",
  "ageClassColumnIndex": "E",
  "colourColumnIndex": "F",
  "outputDirectory": "results",
  "outputFormat": "json",
  "abortScope": "sheet"
}
```

Column indexes are either 0-based numbers or column letters. Options given on the
command line take precedence over the file.

*/

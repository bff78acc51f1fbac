/*!

This is the long-form manual for `survey_metrics` and `surveydash`.

## Files

Two files are read by the dashboard. Both paths can be changed with command line
flags or with a configuration file.

### The store (`data.csv`)

The store is a comma-separated file with one header row:

```text
timestamp,name,category,value
2024-03-01T09:30:00,anonymous,steps,1200.0
2024-03-01T18:02:41,Ada,water,2.5
```

It is created by the first call to `surveydash submit`. Every submission reads the
whole file, adds one row at the end and writes the whole file again. There is no
locking: two submissions running at the same time may lose one of the rows.

When reading the store back:
- a `value` that is not a number is treated as missing
- a `timestamp` that is not a date is treated as missing
- columns other than the four above are kept on disk but ignored

A store that does not exist, that is empty or that cannot be parsed is shown as an
empty table, with a warning.

### The snapshot (`data.json`)

The snapshot is maintained by hand and is never written by `surveydash`:

```json
{
  "weekly_targets": [{"label": "Mon", "target": 10}],
  "sample_actuals": [{"label": "Mon", "value": 7}, {"label": "Tue", "value": 2}]
}
```

Both keys are optional.

## Charts

### Targets vs actuals

The targets and the actuals are merged on their label. A label present on one
side only gets zero on the other side: a missing actual means "no progress yet",
not "unknown".

### Rolling average

The entries of one category are ordered by time and smoothed with a trailing
average over 1 to 7 points (3 by default). The first points average over what is
available so far.

### Picking labels

The same comparison as the first chart, restricted to the labels passed with
`--labels`. All the labels are shown by default.

## Configuration

```json
{
  "storePath": "data.csv",
  "documentPath": "data.json",
  "rollingWindow": 3,
  "labels": ["Mon", "Tue"]
}
```

Relative paths are resolved from the directory of the configuration file.
Command line flags take precedence over the configuration file.

*/

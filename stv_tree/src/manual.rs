/*!

This is the long-form manual for `stv_tree` and `stvtab`.

## Tabulation rules

Each round starts by computing the total number of votes held by the
candidates still running and by the elected candidates, and the Droop quota
`floor(total / (seats + 1)) + 1`. Then exactly one of the following happens:

1. **Surplus** All the running candidates at or above the quota are elected.
   Each keeps exactly the quota. The rest of their votes is transferred to the
   next preferences of their voters, in proportion: if a candidate holds `c`
   votes, a fraction `(c - quota) / c` of each of their ballots moves on.
2. **Elected by default** When no one reaches the quota and the candidates left
   are not more numerous than the seats left, they are all elected.
3. **Elimination** Otherwise the candidate with the fewest votes is eliminated
   and their ballots move on to the next preferences. When several candidates
   have the fewest votes, the one with the lowest id is eliminated.

Ballots that have no running candidate left among their next preferences are
exhausted: they are dropped from the total of the following rounds, so the
quota may decrease from round to round. Elected candidates never receive
transferred ballots.

The count continues until every candidate that received a first preference
has been elected or eliminated. The order of elections and eliminations is
reported, and not only the winners.

## Input formats

`stvtab` reads an election description in JSON:

```text
{
  "outputSettings": {"contestName": "City council"},
  "candidates": [{"id": 1, "name": "Alice"}, {"id": 2, "name": "Bob"}],
  "rules": {"numberOfWinners": 1},
  "ballots": [[1, 2], [2]],
  "cvrFileSources": [{"provider": "csv", "filePath": "ballots.csv"}]
}
```

The ballots can be written directly in the description (`ballots`, candidate
ids in order of preference), or read from files (`cvrFileSources`), or both.

### `csv`

Simple CSV reader. Each column (in order) is a rank. A cell contains either the
name or the id of a candidate. Blank cells are skipped.

```text
count,choice 1,choice 2,choice 3
20,Alice,Bob,
7,Bob,,
```

With this file, the source needs to state where the choices and the counts are:
`"firstVoteColumnIndex": 2, "firstVoteRowIndex": 2, "countColumnIndex": 1`.
All indices start at 1. Without a count column, every row is one ballot.

## Configuration

Rules:
 - `numberOfWinners` (number, default 1): the number of seats.
 - `electRemainingCandidates` (boolean, default true): elect the candidates left
   when they are not more numerous than the seats left.

OutputSettings:
 - `contestName` (string)
 - `contestDate`, `contestJurisdiction`, `contestOffice` (string, optional):
   copied into the summary.

 */

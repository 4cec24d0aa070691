//! Results table and summary statistics

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// One row of the results table
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub case_num: usize,
    pub process_count: usize,
    /// `(N, M, P)` when the input block's dimension line could be read
    pub dims: Option<(usize, usize, usize)>,
    pub elapsed: Duration,
    pub success: bool,
    pub error: Option<String>,
    /// Whether stdout matched the expected output; `None` when not checked
    pub output_match: Option<bool>,
}

impl RunRecord {
    /// `"N x M x P"`, or `"Unknown"` without a dimension line
    pub fn input_size(&self) -> String {
        match self.dims {
            Some((n, m, p)) => format!("{} x {} x {}", n, m, p),
            None => "Unknown".to_string(),
        }
    }
}

/// Writes run records as CSV through a single handle, flushing after every row
pub struct ResultsWriter<W: Write> {
    writer: csv::Writer<W>,
    with_match_column: bool,
}

impl ResultsWriter<File> {
    /// Creates (truncating) the results file and writes the header
    pub fn create<P: AsRef<Path>>(path: P, with_match_column: bool) -> Result<Self, csv::Error> {
        Self::new(File::create(path)?, with_match_column)
    }
}

impl<W: Write> ResultsWriter<W> {
    pub fn new(inner: W, with_match_column: bool) -> Result<Self, csv::Error> {
        let mut writer = csv::Writer::from_writer(inner);

        let mut header = vec![
            "TestCase",
            "ProcessCount",
            "N",
            "M",
            "P",
            "InputSize",
            "ComputationTime(s)",
            "Success",
            "Error",
        ];
        if with_match_column {
            header.push("OutputMatch");
        }
        writer.write_record(&header)?;
        writer.flush()?;

        Ok(Self {
            writer,
            with_match_column,
        })
    }

    pub fn write(&mut self, record: &RunRecord) -> Result<(), csv::Error> {
        let dim = |f: fn((usize, usize, usize)) -> usize| {
            record.dims.map(|d| f(d).to_string()).unwrap_or_default()
        };

        let mut row = vec![
            record.case_num.to_string(),
            record.process_count.to_string(),
            dim(|d| d.0),
            dim(|d| d.1),
            dim(|d| d.2),
            record.input_size(),
            format!("{:.6}", record.elapsed.as_secs_f64()),
            if record.success { "True" } else { "False" }.to_string(),
            // Keep error text free of field separators
            record.error.as_deref().unwrap_or("").replace(',', ";"),
        ];
        if self.with_match_column {
            row.push(match record.output_match {
                Some(true) => "True".to_string(),
                Some(false) => "False".to_string(),
                None => String::new(),
            });
        }

        self.writer.write_record(&row)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes and returns the underlying writer
    pub fn into_inner(self) -> Result<W, csv::Error> {
        self.writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))
    }
}

/// Per-process-count aggregates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessStats {
    pub runs: usize,
    pub successes: usize,
    /// Successful runs whose output was checked
    pub checked: usize,
    /// Checked runs whose output matched
    pub matches: usize,
    /// Summed time of successful runs that did not fail a check
    pub good_time: Duration,
    pub good_runs: usize,
}

impl ProcessStats {
    pub fn success_rate(&self) -> f64 {
        percent(self.successes, self.runs)
    }

    /// `None` if no successful run was checked
    pub fn match_rate(&self) -> Option<f64> {
        (self.checked > 0).then(|| percent(self.matches, self.checked))
    }

    pub fn mean_time(&self) -> Option<Duration> {
        (self.good_runs > 0).then(|| self.good_time / self.good_runs as u32)
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// Aggregated view over a whole benchmark run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub by_process_count: BTreeMap<usize, ProcessStats>,
    pub test_cases: usize,
    pub total_runs: usize,
}

impl Summary {
    pub fn from_records(records: &[RunRecord]) -> Self {
        let mut by_process_count: BTreeMap<usize, ProcessStats> = BTreeMap::new();
        let mut cases = std::collections::BTreeSet::new();

        for record in records {
            cases.insert(record.case_num);
            let stats = by_process_count.entry(record.process_count).or_default();
            stats.runs += 1;
            if !record.success {
                continue;
            }
            stats.successes += 1;
            if let Some(matched) = record.output_match {
                stats.checked += 1;
                if matched {
                    stats.matches += 1;
                }
            }
            if record.output_match != Some(false) {
                stats.good_runs += 1;
                stats.good_time += record.elapsed;
            }
        }

        Self {
            by_process_count,
            test_cases: cases.len(),
            total_runs: records.len(),
        }
    }

    pub fn successful_runs(&self) -> usize {
        self.by_process_count.values().map(|s| s.successes).sum()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Success rate by process count:")?;
        for (np, stats) in &self.by_process_count {
            writeln!(f, "  {:2} processes: {:6.1}%", np, stats.success_rate())?;
        }

        if self.by_process_count.values().any(|s| s.checked > 0) {
            writeln!(f, "Output correctness rate (among successful runs):")?;
            for (np, stats) in &self.by_process_count {
                if let Some(rate) = stats.match_rate() {
                    writeln!(f, "  {:2} processes: {:6.1}%", np, rate)?;
                }
            }
        }

        writeln!(f, "Average computation time (successful runs):")?;
        for (np, stats) in &self.by_process_count {
            if let Some(mean) = stats.mean_time() {
                writeln!(f, "  {:2} processes: {:8.4}s", np, mean.as_secs_f64())?;
            }
        }

        let successes = self.successful_runs();
        writeln!(f, "Total test cases: {}", self.test_cases)?;
        writeln!(f, "Total runs: {}", self.total_runs)?;
        write!(
            f,
            "Successful runs: {} ({:.1}%)",
            successes,
            percent(successes, self.total_runs)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(case_num: usize, np: usize, ms: u64, success: bool) -> RunRecord {
        RunRecord {
            case_num,
            process_count: np,
            dims: Some((3, 4, 5)),
            elapsed: Duration::from_millis(ms),
            success,
            error: (!success).then(|| "ReturnCode:1".to_string()),
            output_match: None,
        }
    }

    #[test]
    fn test_csv_rows() {
        let mut writer = ResultsWriter::new(Vec::new(), false).unwrap();
        writer.write(&record(1, 2, 1500, true)).unwrap();

        let mut failed = record(1, 4, 20, false);
        failed.error = Some("spawn failed, no such file".to_string());
        failed.dims = None;
        writer.write(&failed).unwrap();

        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines[0],
            "TestCase,ProcessCount,N,M,P,InputSize,ComputationTime(s),Success,Error"
        );
        assert_eq!(lines[1], "1,2,3,4,5,3 x 4 x 5,1.500000,True,");
        assert_eq!(lines[2], "1,4,,,,Unknown,0.020000,False,spawn failed; no such file");
    }

    #[test]
    fn test_match_column() {
        let mut writer = ResultsWriter::new(Vec::new(), true).unwrap();
        let mut rec = record(2, 1, 10, true);
        rec.output_match = Some(false);
        writer.write(&rec).unwrap();

        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert!(text.lines().next().unwrap().ends_with(",Error,OutputMatch"));
        assert!(text.lines().nth(1).unwrap().ends_with(",True,,False"));
    }

    #[test]
    fn test_summary() {
        let mut mismatched = record(2, 1, 900, true);
        mismatched.output_match = Some(false);
        let mut matched = record(1, 1, 100, true);
        matched.output_match = Some(true);

        let records = vec![matched, mismatched, record(1, 2, 50, true), record(2, 2, 60, false)];
        let summary = Summary::from_records(&records);

        assert_eq!(summary.test_cases, 2);
        assert_eq!(summary.total_runs, 4);
        assert_eq!(summary.successful_runs(), 3);

        let one = &summary.by_process_count[&1];
        assert_eq!(one.success_rate(), 100.0);
        assert_eq!(one.match_rate(), Some(50.0));
        assert_eq!(one.mean_time(), Some(Duration::from_millis(100)));

        let two = &summary.by_process_count[&2];
        assert_eq!(two.success_rate(), 50.0);
        assert_eq!(two.match_rate(), None);
        assert_eq!(two.mean_time(), Some(Duration::from_millis(50)));

        let text = summary.to_string();
        assert!(text.contains(" 1 processes:  100.0%"));
        assert!(text.contains("Successful runs: 3 (75.0%)"));
    }
}

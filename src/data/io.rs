//! Delimited text readers
//!
//! Instance files hold one instance per line:
//!
//! ```text
//! id;class;outcome;f1=v1,f2=v2
//! ```
//!
//! Sequence files hold one point per line as `time;f1=v1,f2=v2`. Blank lines
//! and lines starting with `#` are skipped in both formats.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::info;

use super::dataset::DataSet;
use super::instance::SparseInstance;
use super::sequence::Sequence;
use crate::error::{PipelineError, Result};

fn parse_number(raw: &str, what: &str, line: usize) -> Result<f64> {
    raw.trim().parse::<f64>().map_err(|_| PipelineError::ParseError {
        line,
        reason: format!("invalid {} '{}'", what, raw.trim()),
    })
}

/// Parse `f1=v1,f2=v2` into pairs. An empty string yields no pairs.
fn parse_values(raw: &str, line: usize) -> Result<Vec<(String, f64)>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|pair| {
            let (feature, value) = pair.split_once('=').ok_or_else(|| PipelineError::ParseError {
                line,
                reason: format!("expected feature=value, got '{}'", pair),
            })?;
            Ok((feature.trim().to_string(), parse_number(value, "value", line)?))
        })
        .collect()
}

fn content_lines<R: Read>(reader: R) -> impl Iterator<Item = (usize, std::io::Result<String>)> {
    BufReader::new(reader)
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| match line {
            Ok(l) => {
                let t = l.trim();
                !t.is_empty() && !t.starts_with('#')
            }
            Err(_) => true,
        })
}

/// Parse one instance line
pub fn parse_instance(line: &str, line_no: usize) -> Result<SparseInstance> {
    let fields: Vec<&str> = line.splitn(4, ';').collect();
    if fields.len() < 3 {
        return Err(PipelineError::ParseError {
            line: line_no,
            reason: format!("expected id;class;outcome[;values], got '{}'", line),
        });
    }
    let outcome = parse_number(fields[2], "outcome", line_no)?;
    let values = match fields.get(3) {
        Some(raw) => parse_values(raw, line_no)?,
        None => Vec::new(),
    };
    Ok(SparseInstance::new(fields[0].trim(), fields[1].trim(), values).with_outcome(outcome))
}

impl DataSet<SparseInstance> {
    /// Read instances from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut ds = DataSet::new();
        for (line_no, line) in content_lines(reader) {
            ds.push(parse_instance(&line?, line_no)?);
        }
        Ok(ds)
    }

    /// Read instances from a file
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let ds = Self::from_reader(File::open(path.as_ref())?)?;
        info!(path = %path.as_ref().display(), n_instances = ds.len(), "Loaded dataset");
        Ok(ds)
    }
}

impl Sequence {
    /// Read points from any reader
    pub fn from_reader<R: Read>(id: impl Into<String>, reader: R) -> Result<Self> {
        let mut seq = Sequence::new(id, "");
        for (line_no, line) in content_lines(reader) {
            let line = line?;
            let (time, values) = line.split_once(';').unwrap_or((line.as_str(), ""));
            let time = parse_number(time, "time", line_no)?;
            let values = parse_values(values, line_no)?;
            seq.push(time, SparseInstance::new("", "", values));
        }
        Ok(seq)
    }

    /// Read a sequence file; the file stem becomes the sequence id
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let seq = Self::from_reader(id, File::open(path)?)?;
        info!(path = %path.display(), n_points = seq.len(), "Loaded sequence");
        Ok(seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Instance;

    #[test]
    fn test_parse_instance() {
        let inst = parse_instance("p1;surgery;4.5;los=3,age=70", 1).unwrap();
        assert_eq!(inst.id, "p1");
        assert_eq!(inst.class_name, "surgery");
        assert_eq!(inst.outcome, 4.5);
        assert_eq!(inst.get("los"), 3.0);
        assert_eq!(inst.get("age"), 70.0);
    }

    #[test]
    fn test_parse_instance_without_values() {
        let inst = parse_instance("p1;c;1", 1).unwrap();
        assert!(inst.is_empty());
    }

    #[test]
    fn test_parse_errors_carry_line() {
        let err = parse_instance("p1;c;abc;x=1", 7).unwrap_err();
        assert!(matches!(err, PipelineError::ParseError { line: 7, .. }));

        let err = parse_instance("p1;c;1;x", 2).unwrap_err();
        assert!(matches!(err, PipelineError::ParseError { line: 2, .. }));

        let err = parse_instance("only-one-field", 3).unwrap_err();
        assert!(matches!(err, PipelineError::ParseError { line: 3, .. }));
    }

    #[test]
    fn test_dataset_from_reader_skips_comments() {
        let text = "# header\n\na;x;1;f=1\nb;y;2;f=2\n";
        let ds = DataSet::from_reader(text.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.get(1).map(|i| i.get("f")), Some(2.0));
    }

    #[test]
    fn test_sequence_from_reader() {
        let text = "1;f=3\n0;f=1\n";
        let seq = Sequence::from_reader("s", text.as_bytes()).unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.points()[0].get("f"), 1.0);
        assert_eq!(seq.times(), &[0.0, 1.0]);
    }
}

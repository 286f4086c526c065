// dispatcher/src/loader.rs

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use log::{debug, warn};
use crate::config::POOL_SIZE;
use crate::error::{DispatchError, Result};

/// One `arrival, service, memory` line of the job file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobRecord {
    pub arrival_time: u64,
    pub service_time: u64,
    pub memory_size: usize,
}

/// Read every job record from the file at `path`.
pub fn load_jobs(path: &Path) -> Result<Vec<JobRecord>> {
    let file = File::open(path).map_err(|source| DispatchError::Open {
        path: path.to_owned(),
        source,
    })?;
    let jobs = parse_jobs(BufReader::new(file))?;
    debug!("loaded {} jobs from {}", jobs.len(), path.display());
    Ok(jobs)
}

/// Parse job records, one per line, fields separated by commas and/or whitespace.
///
/// Lines that are not exactly three integers, or not valid UTF-8, are
/// skipped. Records with values out of range abort the whole load.
pub fn parse_jobs<R: BufRead>(reader: R) -> Result<Vec<JobRecord>> {
    let mut jobs = Vec::new();
    for (index, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        let number = index + 1;
        let Ok(text) = std::str::from_utf8(&line) else {
            warn!("job file line {}: not valid UTF-8, skipped", number);
            continue;
        };
        let text = text.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        match parse_fields(text) {
            Some(fields) => jobs.push(validate(fields, number)?),
            None => warn!("job file line {}: `{}` is not a job record, skipped", number, text),
        }
    }
    Ok(jobs)
}

fn parse_fields(text: &str) -> Option<[i64; 3]> {
    let mut fields = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|field| !field.is_empty())
        .map(str::parse::<i64>);
    let record = [
        fields.next()?.ok()?,
        fields.next()?.ok()?,
        fields.next()?.ok()?,
    ];
    match fields.next() {
        Some(_) => None,
        None => Some(record),
    }
}

fn validate([arrival, service, memory]: [i64; 3], line: usize) -> Result<JobRecord> {
    let invalid = |reason: String| DispatchError::InvalidRecord { line, reason };
    if arrival < 0 {
        return Err(invalid(format!("negative arrival time {}", arrival)));
    }
    if service < 0 {
        return Err(invalid(format!("negative service time {}", service)));
    }
    if memory < 0 {
        return Err(invalid(format!("negative memory size {}", memory)));
    }
    if memory > POOL_SIZE as i64 {
        return Err(invalid(format!(
            "memory size {} exceeds the {} pool",
            memory, POOL_SIZE
        )));
    }
    // a zero sized request can never be granted and would wait forever
    if memory == 0 {
        return Err(invalid("memory size must be at least 1".to_owned()));
    }
    Ok(JobRecord {
        arrival_time: arrival as u64,
        service_time: service as u64,
        memory_size: memory as usize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Vec<JobRecord>> {
        parse_jobs(text.as_bytes())
    }

    fn job(arrival_time: u64, service_time: u64, memory_size: usize) -> JobRecord {
        JobRecord {
            arrival_time,
            service_time,
            memory_size,
        }
    }

    #[test]
    fn commas_and_whitespace_separate_fields() {
        let jobs = parse("0, 5, 600\n3,2,64\n 7 1 8 \n").unwrap();
        assert_eq!(jobs, [job(0, 5, 600), job(3, 2, 64), job(7, 1, 8)]);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let jobs = parse("0, 5\nabc\n1, 2, 3, 4\n\n# comment\n2, x, 4\n4, 4, 4\n").unwrap();
        assert_eq!(jobs, [job(4, 4, 4)]);
    }

    #[test]
    fn binary_lines_are_skipped() {
        let jobs = parse_jobs(&b"0, 5, 600\n\xff\xfe garbage\n1, 2, 8\r\n"[..]).unwrap();
        assert_eq!(jobs, [job(0, 5, 600), job(1, 2, 8)]);

        // line numbers still count the skipped line
        match parse_jobs(&b"\xff\n0, 5, 4096\n"[..]) {
            Err(DispatchError::InvalidRecord { line, .. }) => assert_eq!(line, 2),
            other => panic!("accepted: {:?}", other),
        }
    }

    #[test]
    fn out_of_range_values_are_fatal() {
        for (text, line) in [
            ("0, 1, 1\n-1, 5, 10\n", 2),
            ("0, -5, 10\n", 1),
            ("0, 5, -10\n", 1),
            ("\n\n0, 5, 2049\n", 3),
            ("0, 5, 0\n", 1),
        ] {
            match parse(text) {
                Err(DispatchError::InvalidRecord { line: at, .. }) => assert_eq!(at, line),
                other => panic!("{:?} accepted: {:?}", text, other),
            }
        }
    }

    #[test]
    fn whole_pool_request_is_valid() {
        assert_eq!(parse("0, 3, 2048").unwrap(), [job(0, 3, 2048)]);
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = load_jobs(Path::new("/nonexistent/jobs.txt")).unwrap_err();
        assert!(matches!(err, DispatchError::Open { .. }));
        assert!(err.to_string().contains("jobs.txt"));
    }
}

use std::path::Path;

use common::record::Record;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, stdin, stdout},
    sync::mpsc::Sender,
};
use tracing::{debug, warn};

use crate::errors::DriverError;

pub type Input = Box<dyn AsyncRead + Unpin + Send>;
pub type Output = Box<dyn AsyncWrite + Unpin + Send>;

pub async fn open_input(path: Option<&Path>) -> Result<Input, DriverError> {
    Ok(match path {
        Some(path) => Box::new(File::open(path).await?),
        None => Box::new(stdin()),
    })
}

pub async fn open_output(path: Option<&Path>) -> Result<Output, DriverError> {
    Ok(match path {
        Some(path) => Box::new(File::create(path).await?),
        None => Box::new(stdout()),
    })
}

/// Parses one JSON lines entry. Blank lines are not records and yield `None`.
/// Bytes that are not UTF-8 come back as a JSON error like any other bad line.
pub fn parse_record_line(line: &[u8]) -> Option<Result<Record, serde_json::Error>> {
    if line.iter().all(u8::is_ascii_whitespace) {
        return None;
    }

    Some(serde_json::from_slice::<Record>(line))
}

/// Streams records from `input` into `records` until the input ends or the
/// receiver goes away. Returns how many lines were unreadable.
pub async fn read_records<R>(input: R, records: Sender<Record>) -> Result<u64, DriverError>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(input);
    let mut line = Vec::new();
    let mut line_number: u64 = 0;
    let mut unreadable: u64 = 0;

    loop {
        line.clear();

        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }

        line_number += 1;

        let record = match parse_record_line(&line) {
            None => continue,
            Some(Ok(record)) => record,
            Some(Err(err)) => {
                warn!("Skipping unreadable record on line {line_number}: {err}");
                unreadable += 1;
                continue;
            }
        };

        if records.send(record).await.is_err() {
            debug!("Record receiver closed after line {line_number}");
            break;
        }
    }

    Ok(unreadable)
}

pub async fn write_record<W>(output: &mut W, record: &Record) -> Result<(), DriverError>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(record)?;
    line.push(b'\n');

    output.write_all(&line).await?;

    Ok(())
}

/// Accepts a similarity threshold in `[0, 1]`.
pub fn parse_threshold(value: &str) -> Result<f64, DriverError> {
    let threshold = value
        .parse::<f64>()
        .map_err(|_| DriverError::InvalidArgument(format!("{value} is not a number")))?;

    if !(0.0..=1.0).contains(&threshold) {
        return Err(DriverError::InvalidArgument(format!(
            "similarity threshold {threshold} is outside [0, 1]"
        )));
    }

    Ok(threshold)
}

use driverbench_runner::tag::{ExecutionTag, TAG_PREFIX};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Line written by every driver runner once its benchmark finished
pub const TIME_MARKER: &str = "Benchmark time: ";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Malformed execution tag: {raw}")]
    Tag {
        raw: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Benchmark time {token:?} is not an integer for tag: {raw}")]
    Duration { raw: String, token: String },
}

/// An execution tag together with the time the runner reported
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ResultRecord {
    #[serde(flatten)]
    pub tag: ExecutionTag,
    pub time: u64,
}

/// Output belonging to a single tag, `tag` is the raw text after the prefix
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment<'a> {
    pub tag: &'a str,
    pub body: &'a str,
}

impl<'a> Segment<'a> {
    /// token after the first time marker, if the run reported one
    pub fn time_token(&self) -> Option<&'a str> {
        let body = self.body;

        body.find(TIME_MARKER)
            .map(|position| &body[position + TIME_MARKER.len()..])
            .map(|rest| {
                rest.lines()
                    .next()
                    .and_then(|line| line.split_whitespace().next())
                    .unwrap_or("")
            })
    }

    pub fn execution_tag(&self) -> Result<ExecutionTag, ParseError> {
        serde_json::from_str(self.tag.trim()).map_err(|source| ParseError::Tag {
            raw: self.tag.trim().to_string(),
            source,
        })
    }

    /// `None` for runs that never reported a time
    pub fn record(&self) -> Option<Result<ResultRecord, ParseError>> {
        let token = self.time_token()?;

        Some(self.execution_tag().and_then(|tag| {
            token
                .parse()
                .map(|time| ResultRecord { tag, time })
                .map_err(|_| ParseError::Duration {
                    raw: self.tag.trim().to_string(),
                    token: token.to_string(),
                })
        }))
    }
}

/// Split dispatch output at every tag line, text before the first tag is dropped
pub fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut current: Option<(&str, usize)> = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let start = offset;
        offset += line.len();

        let Some(tag) = line
            .strip_prefix(TAG_PREFIX)
            .filter(|rest| rest.starts_with(' '))
        else {
            continue;
        };

        match current.take() {
            Some((previous, body_start)) => segments.push(Segment {
                tag: previous,
                body: &text[body_start..start],
            }),
            None if start > 0 => debug!("Skipping {start} bytes before the first tag"),
            None => {}
        }

        current = Some((tag, offset));
    }

    if let Some((tag, body_start)) = current {
        segments.push(Segment {
            tag,
            body: &text[body_start..],
        });
    }

    segments
}

/// One entry per run that reported a time, errors are kept per segment
pub fn parse(text: &str) -> Vec<Result<ResultRecord, ParseError>> {
    segments(text)
        .iter()
        .filter_map(|segment| {
            let record = segment.record();

            if record.is_none() {
                debug!("No benchmark time for {}", segment.tag.trim());
            }

            record
        })
        .collect()
}

/// Like `parse` but fails on the first malformed segment
pub fn parse_all(text: &str) -> Result<Vec<ResultRecord>, ParseError> {
    parse(text).into_iter().collect()
}

//! Push-event delivery from newline-delimited JSON.
//!
//! Each line is an envelope `{"event": "<name>", "data": {...}}`. A bare object with a
//! `step` field is taken as a `step_update` body. Blank lines are skipped; lines that
//! are not JSON are logged and skipped. The stream ends at EOF or on a read error.

use std::path::Path;

use futures::StreamExt;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::LinesStream;
use tracing::{info, instrument, warn};

use crate::error::DemoError;
use crate::types::STEP_UPDATE_EVENT;

/// One named event from the push channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundEvent {
  pub event: String,
  #[serde(default)]
  pub data: Value,
}

impl InboundEvent {
  pub fn new(event: impl Into<String>, data: Value) -> Self {
    Self {
      event: event.into(),
      data,
    }
  }

  pub fn step_update(data: Value) -> Self {
    Self::new(STEP_UPDATE_EVENT, data)
  }
}

/// Parses one line. `Ok(None)` for blank lines.
pub fn parse_line(line: &str) -> Result<Option<InboundEvent>, DemoError> {
  let line = line.trim();
  if line.is_empty() {
    return Ok(None);
  }
  let value: Value =
    serde_json::from_str(line).map_err(|e| DemoError::MalformedEvent(e.to_string()))?;
  let map = match value {
    Value::Object(map) => map,
    other => return Err(DemoError::MalformedEvent(format!("not an event: {other}"))),
  };
  if map.get("event").is_some_and(Value::is_string) {
    serde_json::from_value(Value::Object(map))
      .map(Some)
      .map_err(|e| DemoError::MalformedEvent(e.to_string()))
  } else if map.contains_key("step") {
    Ok(Some(InboundEvent::step_update(Value::Object(map))))
  } else {
    Err(DemoError::MalformedEvent(
      "object has neither 'event' nor 'step'".to_string(),
    ))
  }
}

/// Events read line by line from `reader`.
pub fn ndjson_events<R>(reader: R) -> BoxStream<'static, InboundEvent>
where
  R: AsyncBufRead + Unpin + Send + 'static,
{
  LinesStream::new(reader.lines())
    .take_while(|line| {
      if let Err(e) = line {
        warn!(error = %e, "event stream read failed");
      }
      futures::future::ready(line.is_ok())
    })
    .filter_map(|line| async move {
      match parse_line(&line.ok()?) {
        Ok(event) => event,
        Err(e) => {
          warn!(error = %e, "skipping line");
          None
        }
      }
    })
    .boxed()
}

/// Events from a file.
#[instrument(level = "trace", skip(path))]
pub async fn file_events(path: &Path) -> Result<BoxStream<'static, InboundEvent>, DemoError> {
  let file = tokio::fs::File::open(path).await?;
  Ok(ndjson_events(BufReader::new(file)))
}

/// Events from a TCP peer that writes one envelope per line.
#[instrument(level = "trace")]
pub async fn tcp_events(addr: &str) -> Result<BoxStream<'static, InboundEvent>, DemoError> {
  let stream = tokio::net::TcpStream::connect(addr).await?;
  info!(%addr, "connected to event source");
  let connected = futures::stream::once(async { InboundEvent::new("connected", Value::Null) });
  let disconnected = futures::stream::once(async { InboundEvent::new("disconnect", Value::Null) });
  Ok(
    connected
      .chain(ndjson_events(BufReader::new(stream)))
      .chain(disconnected)
      .boxed(),
  )
}

/// Events from standard input.
pub fn stdin_events() -> BoxStream<'static, InboundEvent> {
  ndjson_events(BufReader::new(tokio::io::stdin()))
}

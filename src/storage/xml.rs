//! XML snapshot store
//!
//! Line-oriented reader/writer for the `trains.xml` layout:
//!
//! ```text
//! <Trains>
//!     <Train id="R101">
//!         <Departure>08:30</Departure>
//!         <Arrival>10:00</Arrival>
//!         <Delay>15</Delay>
//!     </Train>
//! </Trains>
//! ```
//!
//! Parsing is lenient: one element per line, unknown lines are ignored, and a
//! block missing a field keeps that field's default (`00:00`, delay 0).

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use crate::error::Result;
use crate::registry::TimeOfDay;

use super::{write_atomically, SnapshotStore, StoredTrain};

/// Snapshot store for the XML layout
#[derive(Debug, Clone)]
pub struct XmlSnapshotStore {
    path: PathBuf,
}

impl XmlSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Render trains to the XML layout
    pub fn render(trains: &[StoredTrain]) -> String {
        let mut out = String::from("<Trains>\n");
        for train in trains {
            // Writing into a String cannot fail
            let _ = write!(
                out,
                "    <Train id=\"{}\">\n        <Departure>{}</Departure>\n        <Arrival>{}</Arrival>\n        <Delay>{}</Delay>\n    </Train>\n",
                train.id, train.departure, train.arrival, train.delay
            );
        }
        out.push_str("</Trains>\n");
        out
    }

    /// Parse the XML layout back into trains
    pub fn parse(text: &str) -> Vec<StoredTrain> {
        let mut trains = Vec::new();
        let mut lines = text.lines();

        while let Some(line) = lines.next() {
            let Some(id) = train_id(line) else {
                continue;
            };

            let mut train = StoredTrain {
                id: id.to_string(),
                departure: TimeOfDay::MIDNIGHT,
                arrival: TimeOfDay::MIDNIGHT,
                delay: 0,
            };

            for line in lines.by_ref() {
                if let Some(value) = element(line, "Departure") {
                    train.departure = parse_time(value, &train.id, "Departure");
                } else if let Some(value) = element(line, "Arrival") {
                    train.arrival = parse_time(value, &train.id, "Arrival");
                } else if let Some(value) = element(line, "Delay") {
                    match value.trim().parse() {
                        Ok(delay) => train.delay = delay,
                        Err(_) => tracing::warn!("Train {}: bad <Delay> value {:?}", train.id, value),
                    }
                } else if line.contains("</Train>") {
                    break;
                }
            }

            trains.push(train);
        }

        trains
    }
}

impl SnapshotStore for XmlSnapshotStore {
    fn load(&self) -> Result<Vec<StoredTrain>> {
        let text = fs::read_to_string(&self.path)?;
        Ok(Self::parse(&text))
    }

    fn save(&self, trains: &[StoredTrain]) -> Result<()> {
        write_atomically(&self.path, Self::render(trains).as_bytes())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// `id` attribute of a `<Train id="...">` opening line
fn train_id(line: &str) -> Option<&str> {
    if !line.contains("<Train") {
        return None;
    }
    let start = line.find("id=\"")? + 4;
    let rest = &line[start..];
    let end = rest.find('"')?;
    Some(&rest[..end])
}

/// Text between `<tag>` and `</tag>` (closing tag optional)
fn element<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{}>", tag);
    let start = line.find(&open)? + open.len();
    let rest = &line[start..];
    let end = rest.find("</").unwrap_or(rest.len());
    Some(&rest[..end])
}

fn parse_time(value: &str, id: &str, tag: &str) -> TimeOfDay {
    TimeOfDay::parse(value).unwrap_or_else(|| {
        tracing::warn!("Train {}: bad <{}> value {:?}", id, tag, value);
        TimeOfDay::MIDNIGHT
    })
}

//! Recording log line format.
//!
//! One event per line: `elapsedMs,Kind,Key` for key kinds and
//! `elapsedMs,Kind,x,y` for pointer kinds.

use crate::{DeviceState, EventKind, Key, LineError, Point, Target};
use std::fmt;
use std::str::FromStr;

/// What a log line refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryTarget {
    Key(Key),
    Point(Point),
}

/// One parsed (or about to be written) recording log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogEntry {
    pub elapsed_ms: u64,
    pub kind: EventKind,
    pub target: EntryTarget,
}

impl LogEntry {
    pub fn key(elapsed_ms: u64, kind: EventKind, key: Key) -> Self {
        Self {
            elapsed_ms,
            kind,
            target: EntryTarget::Key(key),
        }
    }

    pub fn pointer(elapsed_ms: u64, kind: EventKind, point: Point) -> Self {
        Self {
            elapsed_ms,
            kind,
            target: EntryTarget::Point(point),
        }
    }

    /// The line a recorder writes for `state`, or `None` for the initial
    /// state.
    pub fn from_state(elapsed_ms: u64, state: &DeviceState) -> Option<Self> {
        let kind = state.kind?;
        let target = match state.target {
            Target::Key(key) => EntryTarget::Key(key),
            Target::Point(point) => EntryTarget::Point(point),
            Target::None => return None,
        };
        Some(Self {
            elapsed_ms,
            kind,
            target,
        })
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            EntryTarget::Key(key) => write!(f, "{},{},{}", self.elapsed_ms, self.kind, key),
            EntryTarget::Point(p) => write!(f, "{},{},{},{}", self.elapsed_ms, self.kind, p.x, p.y),
        }
    }
}

impl FromStr for LogEntry {
    type Err = LineError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut fields = line.trim().split(',').map(str::trim);

        let elapsed = fields
            .next()
            .filter(|f| !f.is_empty())
            .ok_or(LineError::MissingField("elapsed time"))?;
        let elapsed_ms = elapsed
            .parse::<u64>()
            .map_err(|_| LineError::InvalidElapsed(elapsed.to_string()))?;

        let kind = fields.next().ok_or(LineError::MissingField("event kind"))?;
        let kind = kind
            .parse::<EventKind>()
            .map_err(|e| LineError::UnknownKind(e.0))?;

        let entry = if kind.is_key() {
            let key = fields.next().ok_or(LineError::MissingField("key"))?;
            let key = key
                .parse::<Key>()
                .map_err(|_| LineError::UnknownKey(key.to_string()))?;
            LogEntry::key(elapsed_ms, kind, key)
        } else {
            let x = parse_coordinate(fields.next(), "x")?;
            let y = parse_coordinate(fields.next(), "y")?;
            LogEntry::pointer(elapsed_ms, kind, Point::new(x, y))
        };

        match fields.next() {
            Some(extra) => Err(LineError::TrailingField(extra.to_string())),
            None => Ok(entry),
        }
    }
}

fn parse_coordinate(field: Option<&str>, name: &'static str) -> Result<i32, LineError> {
    let field = field.ok_or(LineError::MissingField(name))?;
    field
        .parse::<i32>()
        .map_err(|_| LineError::InvalidCoordinate(field.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReleasedProbe;

    #[test]
    fn formats_key_and_pointer_lines() {
        assert_eq!(
            LogEntry::key(0, EventKind::KeyDown, Key::A).to_string(),
            "0,KeyDown,A"
        );
        assert_eq!(
            LogEntry::key(17, EventKind::KeyUp, Key::LControlKey).to_string(),
            "17,KeyUp,LControlKey"
        );
        assert_eq!(
            LogEntry::pointer(250, EventKind::MouseWheel, Point::new(0, -120)).to_string(),
            "250,MouseWheel,0,-120"
        );
    }

    #[test]
    fn parses_recorded_lines() {
        assert_eq!(
            "50,KeyUp,A".parse::<LogEntry>(),
            Ok(LogEntry::key(50, EventKind::KeyUp, Key::A))
        );
        assert_eq!(
            "120,MouseMove,640,-3\r\n".parse::<LogEntry>(),
            Ok(LogEntry::pointer(120, EventKind::MouseMove, Point::new(640, -3)))
        );
        assert_eq!(
            "9,KeyPress,D0".parse::<LogEntry>(),
            Ok(LogEntry::key(9, EventKind::KeyPress, Key::D0))
        );
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(
            "".parse::<LogEntry>(),
            Err(LineError::MissingField("elapsed time"))
        );
        assert_eq!(
            "abc,KeyDown,A".parse::<LogEntry>(),
            Err(LineError::InvalidElapsed("abc".into()))
        );
        assert_eq!(
            "-5,KeyDown,A".parse::<LogEntry>(),
            Err(LineError::InvalidElapsed("-5".into()))
        );
        assert_eq!(
            "0,Click,A".parse::<LogEntry>(),
            Err(LineError::UnknownKind("Click".into()))
        );
        assert_eq!(
            "0,KeyDown,NotAKey".parse::<LogEntry>(),
            Err(LineError::UnknownKey("NotAKey".into()))
        );
        assert_eq!(
            "0,KeyDown".parse::<LogEntry>(),
            Err(LineError::MissingField("key"))
        );
        assert_eq!(
            "0,MouseMove,10".parse::<LogEntry>(),
            Err(LineError::MissingField("y"))
        );
        assert_eq!(
            "0,MouseMove,10,x".parse::<LogEntry>(),
            Err(LineError::InvalidCoordinate("x".into()))
        );
        assert_eq!(
            "0,KeyDown,A,B".parse::<LogEntry>(),
            Err(LineError::TrailingField("B".into()))
        );
    }

    #[test]
    fn initial_state_has_no_line() {
        let s0 = DeviceState::initial(&ReleasedProbe, Point::default());
        assert_eq!(LogEntry::from_state(0, &s0), None);
        let s1 = s0.with_key(Key::Q, true);
        assert_eq!(
            LogEntry::from_state(3, &s1),
            Some(LogEntry::key(3, EventKind::KeyDown, Key::Q))
        );
    }
}

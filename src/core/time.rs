use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    qso::{LogDocument, TimedContact, TimedLog},
    types::{Callsign, RawTimestamp, UTC_OFFSET_HOURS, Zone, ZuluTime},
};

/// Which end of the contact list lacks an anchor time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEnd {
    /// The first contact.
    First,
    /// The last contact.
    Last,
}

impl fmt::Display for LogEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEnd::First => f.write_str("first"),
            LogEnd::Last => f.write_str("last"),
        }
    }
}

/// Time reconstruction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    /// A local, am or pm time with no `utc` statement. `contact` is 1-based.
    #[error("contact {contact} ({call}): local time `{raw}` needs a `utc` offset statement")]
    UnresolvedTimezone {
        /// 1-based contact position.
        contact: usize,
        /// Callsign of that contact.
        call: Callsign,
        /// The time as written.
        raw: RawTimestamp,
    },
    /// The first or last contact has no time.
    #[error("{end} contact ({call}) needs an explicit time to anchor interpolation")]
    MissingAnchor {
        /// Which end.
        end: LogEnd,
        /// Callsign of that contact.
        call: Callsign,
    },
    /// The preamble offset lies outside [`UTC_OFFSET_HOURS`].
    #[error("utc offset {0} is outside -24..=24 hours")]
    OffsetOutOfRange(i32),
}

/// Converts an authored time to UTC minutes.
///
/// `None` when the zone is local, am or pm and no offset is known.
/// An offset of zero is a known offset. `utc_offset` must lie within
/// [`UTC_OFFSET_HOURS`]; [`normalize`] checks this before converting.
pub fn to_zulu(ts: RawTimestamp, utc_offset: Option<i32>) -> Option<ZuluTime> {
    let shift = match ts.zone {
        Zone::Zulu => return Some(ZuluTime::from_hour_minute(ts.hour(), ts.minute())),
        Zone::Local | Zone::Am => 0,
        Zone::Pm => 12,
    };
    let offset = utc_offset?;
    Some(ZuluTime::from_hour_minute(ts.hour() + shift - offset, ts.minute()))
}

/// Fills every `None` by linear interpolation between the nearest known
/// neighbours, rounding each step half-to-even.
///
/// Known entries are returned unchanged. Both ends must be known.
pub fn interpolate(times: &[Option<ZuluTime>]) -> Result<Vec<ZuluTime>, LogEnd> {
    let Some(first) = times.first() else {
        return Ok(Vec::new());
    };
    let mut t1 = first.ok_or(LogEnd::First)?;
    if times.last().copied().flatten().is_none() {
        return Err(LogEnd::Last);
    }

    let mut resolved = Vec::with_capacity(times.len());
    resolved.push(t1);
    let mut p1 = 0usize;

    for (p2, t) in times.iter().enumerate().skip(1) {
        let Some(t2) = *t else {
            continue;
        };
        let rate = f64::from(t2.minutes() - t1.minutes()) / (p2 - p1) as f64;
        for p in p1 + 1..p2 {
            let step = (rate * (p - p1) as f64).round_ties_even() as i32;
            resolved.push(ZuluTime(t1.minutes() + step));
        }
        resolved.push(t2);
        p1 = p2;
        t1 = t2;
    }

    Ok(resolved)
}

/// Converts authored times to UTC, then interpolates the missing ones.
pub fn normalize(log: LogDocument) -> Result<TimedLog, TimeError> {
    let offset = log.preamble.utc_offset;
    if let Some(hours) = offset.filter(|h| !UTC_OFFSET_HOURS.contains(h)) {
        return Err(TimeError::OffsetOutOfRange(hours));
    }

    let authored = log
        .records
        .iter()
        .enumerate()
        .map(|(idx, rec)| {
            rec.timestamp
                .map(|raw| {
                    to_zulu(raw, offset).ok_or_else(|| TimeError::UnresolvedTimezone {
                        contact: idx + 1,
                        call: rec.their_call.clone(),
                        raw,
                    })
                })
                .transpose()
        })
        .collect::<Result<Vec<_>, _>>()?;

    let resolved = interpolate(&authored).map_err(|end| {
        let rec = match end {
            LogEnd::First => log.records.first(),
            LogEnd::Last => log.records.last(),
        };
        TimeError::MissingAnchor {
            end,
            call: rec.map(|r| r.their_call.clone()).unwrap_or_else(|| Callsign::new("")),
        }
    })?;

    let contacts: Vec<TimedContact> = log
        .records
        .into_iter()
        .zip(resolved)
        .map(|(record, zulu)| {
            if zulu.crosses_midnight() {
                warn!(call = %record.their_call, minutes = zulu.minutes(), "time falls outside the activation date");
            }
            TimedContact {
                interpolated: record.timestamp.is_none(),
                record,
                zulu,
            }
        })
        .collect();

    debug!(
        contacts = contacts.len(),
        interpolated = contacts.iter().filter(|c| c.interpolated).count(),
        "times resolved"
    );

    Ok(TimedLog {
        preamble: log.preamble,
        contacts,
    })
}

//! Run progress reporting.
//!
//! The pipeline emits `SyncEvent`s to a `SyncReporter` instead of printing,
//! so runs can be observed (or asserted on) without capturing stdout.

use std::fmt;
use std::sync::Mutex;
use tracing::debug;

/// Event severity; the console reporter picks its sentinel from it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// A remote service accepted our credentials
    Connected { service: &'static str },
    Fetched { total: usize },
    RunningFiltered { running: usize },
    NoRunningActivities,
    LedgerLoaded { existing: usize },
    AlreadyRecorded { activity_id: String },
    GearResolved { activity_id: String, name: String, id: String },
    Added {
        activity_id: String,
        date: String,
        name: String,
        distance_km: f64,
    },
    /// One activity could not be processed; the run continues
    ActivityFailed { activity_id: Option<String>, error: String },
    Finished(SyncSummary),
    /// The run stopped early
    Aborted { stage: &'static str, error: String },
}

impl SyncEvent {
    pub fn severity(&self) -> Severity {
        match self {
            Self::GearResolved { .. } => Severity::Debug,
            Self::Connected { .. } | Self::Added { .. } => Severity::Success,
            Self::ActivityFailed { .. } | Self::Aborted { .. } => Severity::Error,
            Self::Finished(_)
            | Self::Fetched { .. }
            | Self::RunningFiltered { .. }
            | Self::NoRunningActivities
            | Self::LedgerLoaded { .. }
            | Self::AlreadyRecorded { .. } => Severity::Info,
        }
    }
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected { service } => write!(f, "Connected to {}", service),
            Self::Fetched { total } => write!(f, "Found {} total activities", total),
            Self::RunningFiltered { running } => write!(f, "Found {} running activities", running),
            Self::NoRunningActivities => write!(f, "No running activities found in recent data"),
            Self::LedgerLoaded { existing } => write!(f, "Found {} existing entries", existing),
            Self::AlreadyRecorded { activity_id } => {
                write!(f, "Skipping activityId {} - already exists", activity_id)
            }
            Self::GearResolved { activity_id, name, id } => {
                write!(f, "activityId={} shoe_name={} shoe_id={}", activity_id, name, id)
            }
            Self::Added {
                activity_id,
                date,
                name,
                distance_km,
            } => write!(
                f,
                "Added: {} - {} ({} km) [id={}]",
                date, name, distance_km, activity_id
            ),
            Self::ActivityFailed {
                activity_id: Some(id),
                error,
            } => write!(f, "Error processing activity {}: {}", id, error),
            Self::ActivityFailed {
                activity_id: None,
                error,
            } => write!(f, "Error processing activity: {}", error),
            Self::Finished(summary) if summary.added > 0 => write!(
                f,
                "Successfully added {} new running activities! ({})",
                summary.added, summary
            ),
            Self::Finished(summary) => write!(f, "No new activities to add ({})", summary),
            Self::Aborted { stage, error } => write!(f, "Failed to {}: {}", stage, error),
        }
    }
}

/// Counts for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Activities returned by the list endpoint
    pub fetched: usize,
    /// Of those, running-type activities
    pub running: usize,
    /// Ids already present in the sheet when the run started
    pub existing: usize,
    /// Rows appended
    pub added: usize,
    /// Running activities already recorded
    pub skipped: usize,
    /// Activities that could not be processed
    pub failed: usize,
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Fetched: {}, Running: {}, Added: {}, Skipped: {}",
            self.fetched, self.running, self.added, self.skipped
        )?;
        if self.failed > 0 {
            write!(f, ", Failed: {}", self.failed)?;
        }
        Ok(())
    }
}

pub trait SyncReporter: Send + Sync {
    fn report(&self, event: SyncEvent);
}

/// Status lines on stdout with ✅/❌ sentinels. Each event has one sink:
/// debug-level events go to tracing, everything else to stdout.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    /// The stdout line for an event, or `None` when it is tracing-only
    pub fn line(event: &SyncEvent) -> Option<String> {
        let prefix = match (event, event.severity()) {
            (_, Severity::Debug) => return None,
            (SyncEvent::Finished(s), _) if s.added > 0 => "🎉 ",
            (SyncEvent::Finished(_), _) => "✓ ",
            (_, severity) => Self::sentinel(severity),
        };
        Some(format!("{}{}", prefix, event))
    }

    fn sentinel(severity: Severity) -> &'static str {
        match severity {
            Severity::Success => "✅ ",
            Severity::Error => "❌ ",
            Severity::Debug | Severity::Info => "",
        }
    }
}

impl SyncReporter for ConsoleReporter {
    fn report(&self, event: SyncEvent) {
        match Self::line(&event) {
            Some(line) => println!("{}", line),
            None => debug!("{}", event),
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: Mutex<Vec<SyncEvent>>,
}

impl MemoryReporter {
    pub fn events(&self) -> Vec<SyncEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.events()
            .iter()
            .filter(|e| e.severity() == severity)
            .count()
    }
}

impl SyncReporter for MemoryReporter {
    fn report(&self, event: SyncEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_added_line() {
        let event = SyncEvent::Added {
            activity_id: "123".to_string(),
            date: "2026-10-01".to_string(),
            name: "Morning Run".to_string(),
            distance_km: 5.02,
        };
        assert_eq!(event.severity(), Severity::Success);
        assert_eq!(event.to_string(), "Added: 2026-10-01 - Morning Run (5.02 km) [id=123]");
    }

    #[test]
    fn test_finished_wording() {
        let none = SyncEvent::Finished(SyncSummary {
            fetched: 3,
            running: 2,
            skipped: 2,
            ..Default::default()
        });
        assert!(none.to_string().starts_with("No new activities to add"));

        let some = SyncEvent::Finished(SyncSummary {
            added: 1,
            ..Default::default()
        });
        assert!(some.to_string().starts_with("Successfully added 1 new"));
    }

    #[test]
    fn test_summary_display_hides_zero_failures() {
        let mut summary = SyncSummary {
            fetched: 3,
            running: 2,
            added: 1,
            skipped: 1,
            ..Default::default()
        };
        assert_eq!(summary.to_string(), "Fetched: 3, Running: 2, Added: 1, Skipped: 1");
        summary.failed = 2;
        assert!(summary.to_string().ends_with(", Failed: 2"));
    }

    #[test]
    fn test_console_line_per_event() {
        let failed = SyncEvent::ActivityFailed {
            activity_id: Some("7".to_string()),
            error: "bad payload".to_string(),
        };
        assert_eq!(
            ConsoleReporter::line(&failed).as_deref(),
            Some("❌ Error processing activity 7: bad payload")
        );

        let aborted = SyncEvent::Aborted {
            stage: "sync activities",
            error: "timeout".to_string(),
        };
        assert_eq!(
            ConsoleReporter::line(&aborted).as_deref(),
            Some("❌ Failed to sync activities: timeout")
        );

        let connected = SyncEvent::Connected { service: "Garmin" };
        assert_eq!(
            ConsoleReporter::line(&connected).as_deref(),
            Some("✅ Connected to Garmin")
        );

        let fetched = SyncEvent::Fetched { total: 4 };
        assert_eq!(
            ConsoleReporter::line(&fetched).as_deref(),
            Some("Found 4 total activities")
        );

        let finished = SyncEvent::Finished(SyncSummary {
            added: 2,
            ..Default::default()
        });
        assert!(ConsoleReporter::line(&finished).unwrap().starts_with("🎉 "));

        let gear = SyncEvent::GearResolved {
            activity_id: "7".to_string(),
            name: String::new(),
            id: String::new(),
        };
        assert_eq!(ConsoleReporter::line(&gear), None);
    }

    #[test]
    fn test_memory_reporter_counts_by_severity() {
        let reporter = MemoryReporter::default();
        reporter.report(SyncEvent::Fetched { total: 1 });
        reporter.report(SyncEvent::ActivityFailed {
            activity_id: None,
            error: "boom".to_string(),
        });
        assert_eq!(reporter.events().len(), 2);
        assert_eq!(reporter.count(Severity::Error), 1);
    }
}

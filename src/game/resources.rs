//! Empire-wide resource snapshot and its live projection.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

const MS_PER_HOUR: f64 = 3_600_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Energy,
    Minerals,
    Alloys,
    Antimatter,
    Research,
    Authority,
}

impl ResourceType {
    pub const ALL: [ResourceType; 6] = [
        ResourceType::Energy,
        ResourceType::Minerals,
        ResourceType::Alloys,
        ResourceType::Antimatter,
        ResourceType::Research,
        ResourceType::Authority,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ResourceType::Energy => "energy",
            ResourceType::Minerals => "minerals",
            ResourceType::Alloys => "alloys",
            ResourceType::Antimatter => "antimatter",
            ResourceType::Research => "research",
            ResourceType::Authority => "authority",
        }
    }
}

/// Point-in-time stock of one resource. `change` is per hour.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub amount: f64,
    pub change: f64,
    pub capacity: Option<f64>,
    pub updated_at: Option<String>,
}

impl ResourceDescriptor {
    /// Parsed `updated_at`. Timestamps without an offset are read as UTC.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.updated_at.as_deref()?;
        if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
            return Some(stamp.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }
}

/// Displayed amount of `descriptor` at `now`.
///
/// Linear extrapolation from the snapshot, rounded half-up and capped at
/// `capacity`. There is no lower bound: depleting resources keep falling.
pub fn project(descriptor: &ResourceDescriptor, now: DateTime<Utc>) -> f64 {
    let Some(updated_at) = descriptor.updated_at() else {
        return descriptor.amount;
    };
    let hours = (now - updated_at).num_milliseconds() as f64 / MS_PER_HOUR;
    let current = (descriptor.amount + descriptor.change * hours + 0.5).floor();
    match descriptor.capacity {
        Some(capacity) => current.min(capacity),
        None => current,
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourcesData {
    pub energy: ResourceDescriptor,
    pub minerals: ResourceDescriptor,
    pub alloys: ResourceDescriptor,
    pub antimatter: ResourceDescriptor,
    pub research: ResourceDescriptor,
    pub authority: ResourceDescriptor,
}

impl ResourcesData {
    pub fn get(&self, resource: ResourceType) -> &ResourceDescriptor {
        match resource {
            ResourceType::Energy => &self.energy,
            ResourceType::Minerals => &self.minerals,
            ResourceType::Alloys => &self.alloys,
            ResourceType::Antimatter => &self.antimatter,
            ResourceType::Research => &self.research,
            ResourceType::Authority => &self.authority,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceType, &ResourceDescriptor)> {
        ResourceType::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }

    /// Copy with every amount replaced by its projection at `now`.
    /// Used for display only; the stored snapshot is never rewritten.
    pub fn projected(&self, now: DateTime<Utc>) -> ResourcesData {
        let at = |d: &ResourceDescriptor| ResourceDescriptor {
            amount: project(d, now),
            ..d.clone()
        };
        ResourcesData {
            energy: at(&self.energy),
            minerals: at(&self.minerals),
            alloys: at(&self.alloys),
            antimatter: at(&self.antimatter),
            research: at(&self.research),
            authority: at(&self.authority),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn descriptor(amount: f64, change: f64, capacity: Option<f64>) -> ResourceDescriptor {
        ResourceDescriptor {
            amount,
            change,
            capacity,
            updated_at: Some(base().to_rfc3339()),
        }
    }

    #[test]
    fn never_synced_descriptor_is_not_extrapolated() {
        let d = ResourceDescriptor {
            amount: 42.0,
            change: 1000.0,
            capacity: Some(10.0),
            updated_at: None,
        };
        for hours in [-5, 0, 3, 10_000] {
            assert_eq!(project(&d, base() + Duration::hours(hours)), 42.0);
        }
    }

    #[test]
    fn extrapolates_then_clamps_at_capacity() {
        let d = descriptor(100.0, 10.0, Some(150.0));
        assert_eq!(project(&d, base() + Duration::hours(2)), 120.0);
        assert_eq!(project(&d, base() + Duration::hours(10)), 150.0);
    }

    #[test]
    fn capacity_is_an_upper_bound_for_every_instant() {
        let d = descriptor(90.0, 7.5, Some(100.0));
        for minutes in (0..2000).step_by(37) {
            assert!(project(&d, base() + Duration::minutes(minutes)) <= 100.0);
        }
    }

    #[test]
    fn negative_change_falls_below_zero() {
        let d = descriptor(10.0, -4.0, Some(50.0));
        assert_eq!(project(&d, base() + Duration::hours(5)), -10.0);
    }

    #[test]
    fn direction_follows_sign_of_change() {
        let at = |d: &ResourceDescriptor, h: i64| project(d, base() + Duration::hours(h));

        let rising = descriptor(0.0, 3.0, None);
        assert!(at(&rising, 1) < at(&rising, 2));

        let flat = descriptor(7.0, 0.0, None);
        assert_eq!(at(&flat, 1), at(&flat, 200));

        let falling = descriptor(0.0, -3.0, None);
        assert!(at(&falling, 1) > at(&falling, 2));
    }

    #[test]
    fn rounds_halves_upward() {
        let d = descriptor(0.0, 1.0, None);
        assert_eq!(project(&d, base() + Duration::minutes(30)), 1.0);
        let d = descriptor(0.0, -1.0, None);
        assert_eq!(project(&d, base() + Duration::minutes(30)), 0.0);
    }

    #[test]
    fn naive_timestamps_are_read_as_utc() {
        let d = ResourceDescriptor {
            amount: 0.0,
            change: 1.0,
            capacity: None,
            updated_at: Some("2024-03-01T12:00:00.250000".to_string()),
        };
        assert_eq!(d.updated_at().unwrap().timestamp_millis(), base().timestamp_millis() + 250);
    }

    #[test]
    fn projection_leaves_rates_and_capacity_alone() {
        let data = ResourcesData {
            minerals: descriptor(10.0, 2.0, Some(11.0)),
            ..Default::default()
        };
        let view = data.projected(base() + Duration::hours(4));
        assert_eq!(view.minerals.amount, 11.0);
        assert_eq!(view.minerals.change, 2.0);
        assert_eq!(data.minerals.amount, 10.0);
        assert_eq!(view.iter().count(), 6);
    }
}

//! Idempotent export naming
//!
//! Names are derived from the client identity and the active reporting
//! period, not from a counter: exporting the same state twice produces the
//! same name.

use reportsmith_model::{ClientRef, DateRange};

/// Stable basename for an export of this client and period
///
/// `acme-downtown_20260801-20260807`; falls back to the client id when the
/// name slugs to nothing.
#[must_use]
pub fn export_basename(client: &ClientRef, range: &DateRange) -> String {
    let slug = client.slug();
    let identity = if slug.is_empty() {
        client.id.simple().to_string()
    } else {
        slug
    };
    format!("{identity}_{}", range.compact_label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn august_week() -> DateRange {
        DateRange::new(
            Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 8, 7, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn name_combines_slug_and_period() {
        let client = ClientRef::new("Acme Downtown");
        assert_eq!(
            export_basename(&client, &august_week()),
            "acme-downtown_20260801-20260807"
        );
    }

    #[test]
    fn repeated_exports_name_identically() {
        let client = ClientRef::new("Harbor Storage");
        let range = august_week();
        assert_eq!(
            export_basename(&client, &range),
            export_basename(&client, &range)
        );
    }

    #[test]
    fn unsluggable_name_falls_back_to_id() {
        let client = ClientRef::new("株式会社");
        let name = export_basename(&client, &august_week());
        assert!(name.starts_with(&client.id.simple().to_string()));
    }
}

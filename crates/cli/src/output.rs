//! Operator-facing rendering of listings and migration results.

use chrono::{DateTime, Utc};
use recording_migrator_migration::{AnnotatedMeeting, MigrationResult, SourceCleanup};
use recording_migrator_source::{Person, Site};
use serde_json::{json, Value};

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn print_sites(sites: &[Site], as_json: bool) {
    if as_json {
        println!("{}", json!(sites));
        return;
    }
    for site in sites {
        let marker: &str = if site.default { " (default)" } else { "" };
        println!("{}{}", site.site_url, marker);
    }
}

pub fn print_people(people: &[Person], as_json: bool) {
    if as_json {
        println!("{}", json!(people));
        return;
    }
    for person in people {
        println!(
            "{:<40} {:<30} {}",
            person.id,
            person.display_name,
            person.emails.join(", ")
        );
    }
}

pub fn print_recordings(recordings: &[AnnotatedMeeting], as_json: bool) {
    if as_json {
        println!("{}", json!(recordings));
        return;
    }
    if recordings.is_empty() {
        println!("No recordings in this window.");
        return;
    }
    for m in recordings {
        let status: &str = if m.already_in_target { "in store" } else { "source only" };
        println!(
            "{:<34} {:<12} {:<16} {}",
            m.record.id,
            status,
            timestamp(m.record.started_at),
            m.record.topic
        );
    }
}

pub fn print_migrated_ids(ids: &[String], as_json: bool) {
    if as_json {
        println!("{}", json!(ids));
        return;
    }
    for id in ids {
        println!("{}", id);
    }
}

pub fn result_to_json(result: &MigrationResult) -> Value {
    let migrated: Vec<Value> = result
        .migrated
        .iter()
        .map(|m| {
            let (deleted, kept_reason) = match &m.cleanup {
                SourceCleanup::Deleted => (true, None),
                SourceCleanup::Kept { reason } => (false, Some(reason.clone())),
            };
            json!({
                "id": m.record.id,
                "topic": m.record.topic,
                "deleted_from_source": deleted,
                "kept_reason": kept_reason,
            })
        })
        .collect();

    let failed: Vec<Value> = result
        .failed
        .iter()
        .map(|f| {
            json!({
                "id": f.record.id,
                "topic": f.record.topic,
                "reason": f.reason.to_string(),
            })
        })
        .collect();

    json!({
        "migrated": migrated,
        "failed": failed,
        "store_link": result.store_link,
    })
}

pub fn print_result(result: &MigrationResult, as_json: bool) {
    if as_json {
        println!("{}", result_to_json(result));
        return;
    }

    println!("Migrated ({}):", result.migrated.len());
    for m in &result.migrated {
        match &m.cleanup {
            SourceCleanup::Deleted => println!("  {}  {}", m.record.id, m.record.topic),
            SourceCleanup::Kept { reason } => println!(
                "  {}  {}  [still in source: {}]",
                m.record.id, m.record.topic, reason
            ),
        }
    }

    println!("Failed ({}):", result.failed.len());
    for f in &result.failed {
        println!("  {}  {}  [{}]", f.record.id, f.record.topic, f.reason);
    }

    println!("Store: {}", result.store_link);
}

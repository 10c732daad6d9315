//! Target object key format: `{topic}---{meeting_id}.{extension}`.
//!
//! The key is the only place the migration records which source meeting an
//! object came from, so parsing must round-trip every key this module builds.

use std::fmt;

use recording_migrator_common::KEY_SEPARATOR;
use thiserror::Error;

/// Reasons a store key is not a migrated recording key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyParseError {
    /// No usable `.{extension}` suffix.
    #[error("Key '{key}' has no extension")]
    MissingExtension { key: String },

    /// The stem does not split into exactly topic and meeting id.
    #[error("Key '{key}' has {segments} segment(s) around '---', expected 2")]
    WrongSegmentCount { key: String, segments: usize },

    /// The meeting id segment is empty or unusable.
    #[error("Key '{key}' has an invalid meeting id")]
    InvalidMeetingId { key: String },
}

/// A parsed or constructed target object key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    topic: String,
    meeting_id: String,
    extension: String,
}

impl ObjectKey {
    /// Build a key for a recording.
    ///
    /// The topic is sanitised with [`sanitize_topic`] so the result always parses
    /// back to the same meeting id.
    ///
    /// # Arguments
    /// * `topic` - Display title of the meeting
    /// * `meeting_id` - Source recording identifier
    /// * `extension` - File extension without the dot
    pub fn new(topic: &str, meeting_id: &str, extension: &str) -> Result<Self, KeyParseError> {
        let key_for_error = || format!("{}{}{}.{}", topic, KEY_SEPARATOR, meeting_id, extension);

        if meeting_id.is_empty() || meeting_id.contains(KEY_SEPARATOR) || meeting_id.contains('/') {
            return Err(KeyParseError::InvalidMeetingId {
                key: key_for_error(),
            });
        }
        if !valid_extension(extension) {
            return Err(KeyParseError::MissingExtension {
                key: key_for_error(),
            });
        }

        Ok(Self {
            topic: sanitize_topic(topic),
            meeting_id: meeting_id.to_string(),
            extension: extension.to_string(),
        })
    }

    /// Parse a key relative to the store location prefix.
    ///
    /// # Arguments
    /// * `key` - Object key such as `"My Demo---abc123.mp4"`
    pub fn parse(key: &str) -> Result<Self, KeyParseError> {
        let (stem, extension) = key
            .rsplit_once('.')
            .filter(|(_, ext)| valid_extension(ext))
            .ok_or_else(|| KeyParseError::MissingExtension {
                key: key.to_string(),
            })?;

        let segments: Vec<&str> = stem.split(KEY_SEPARATOR).collect();
        let [topic, meeting_id] = segments.as_slice() else {
            return Err(KeyParseError::WrongSegmentCount {
                key: key.to_string(),
                segments: segments.len(),
            });
        };

        if meeting_id.is_empty() {
            return Err(KeyParseError::InvalidMeetingId {
                key: key.to_string(),
            });
        }

        Ok(Self {
            topic: topic.to_string(),
            meeting_id: meeting_id.to_string(),
            extension: extension.to_string(),
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn meeting_id(&self) -> &str {
        &self.meeting_id
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}.{}",
            self.topic, KEY_SEPARATOR, self.meeting_id, self.extension
        )
    }
}

/// Make a topic safe to embed in a key.
///
/// Runs of three or more `-` collapse to `--` and trailing `-` is trimmed, so the
/// topic can neither contain the separator nor merge into it.
pub fn sanitize_topic(topic: &str) -> String {
    let mut out: String = String::with_capacity(topic.len());
    let mut dash_run: usize = 0;

    for c in topic.chars() {
        if c == '-' {
            dash_run += 1;
            if dash_run > 2 {
                continue;
            }
        } else {
            dash_run = 0;
        }
        out.push(c);
    }

    out.trim_end_matches('-').to_string()
}

fn valid_extension(ext: &str) -> bool {
    !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_demo_key() {
        let key: ObjectKey = ObjectKey::parse("My Demo---abc123.mp4").unwrap();
        assert_eq!(key.meeting_id(), "abc123");
        assert_eq!(key.topic(), "My Demo");
        assert_eq!(key.extension(), "mp4");
    }

    #[test]
    fn test_parse_topic_with_dots() {
        let key: ObjectKey = ObjectKey::parse("Q3 review v1.2---f00d.mp4").unwrap();
        assert_eq!(key.meeting_id(), "f00d");
        assert_eq!(key.topic(), "Q3 review v1.2");
    }

    #[test]
    fn test_parse_no_separator() {
        assert_eq!(
            ObjectKey::parse("NoSeparator.mp4"),
            Err(KeyParseError::WrongSegmentCount {
                key: "NoSeparator.mp4".into(),
                segments: 1
            })
        );
    }

    #[test]
    fn test_parse_too_many_separators() {
        assert!(matches!(
            ObjectKey::parse("a---b---c.mp4"),
            Err(KeyParseError::WrongSegmentCount { segments: 3, .. })
        ));
    }

    #[test]
    fn test_parse_missing_extension() {
        assert!(matches!(
            ObjectKey::parse("Topic---abc123"),
            Err(KeyParseError::MissingExtension { .. })
        ));
        assert!(matches!(
            ObjectKey::parse("Topic---abc123."),
            Err(KeyParseError::MissingExtension { .. })
        ));
    }

    #[test]
    fn test_parse_empty_meeting_id() {
        assert!(matches!(
            ObjectKey::parse("Topic---.mp4"),
            Err(KeyParseError::InvalidMeetingId { .. })
        ));
    }

    #[test]
    fn test_new_sanitises_separator_in_topic() {
        let key: ObjectKey = ObjectKey::new("Plan --- Review", "m1", "mp4").unwrap();
        assert_eq!(key.topic(), "Plan -- Review");
        assert_eq!(key.to_string(), "Plan -- Review---m1.mp4");
    }

    #[test]
    fn test_new_rejects_bad_meeting_id() {
        assert!(ObjectKey::new("Topic", "", "mp4").is_err());
        assert!(ObjectKey::new("Topic", "a---b", "mp4").is_err());
        assert!(ObjectKey::new("Topic", "a/b", "mp4").is_err());
    }

    #[test]
    fn test_sanitize_topic() {
        assert_eq!(sanitize_topic("a---b"), "a--b");
        assert_eq!(sanitize_topic("a-------b"), "a--b");
        assert_eq!(sanitize_topic("trailing-"), "trailing");
        assert_eq!(sanitize_topic("plain"), "plain");
        assert_eq!(sanitize_topic(""), "");
    }

    proptest! {
        #[test]
        fn prop_well_formed_keys_round_trip(
            topic in "[A-Za-z0-9 _.()-]{0,40}",
            id in "[A-Za-z0-9_]{1,40}",
            ext in "[a-z0-9]{1,5}",
        ) {
            prop_assume!(!topic.contains(KEY_SEPARATOR) && !topic.ends_with('-'));
            let raw: String = format!("{}---{}.{}", topic, id, ext);
            let parsed: ObjectKey = ObjectKey::parse(&raw).unwrap();
            prop_assert_eq!(parsed.meeting_id(), id.as_str());
            prop_assert_eq!(parsed.topic(), topic.as_str());
            prop_assert_eq!(parsed.to_string(), raw);
        }

        #[test]
        fn prop_built_keys_parse_back(
            topic in ".{0,40}",
            id in "[A-Za-z0-9_]{1,40}",
        ) {
            let built: ObjectKey = ObjectKey::new(&topic, &id, "mp4").unwrap();
            prop_assert!(!built.topic().contains(KEY_SEPARATOR));
            let parsed: ObjectKey = ObjectKey::parse(&built.to_string()).unwrap();
            prop_assert_eq!(parsed.meeting_id(), id.as_str());
        }

        #[test]
        fn prop_keys_without_separator_never_parse(
            stem in "[A-Za-z0-9 _]{0,40}",
        ) {
            let raw: String = format!("{}.mp4", stem);
            prop_assert!(ObjectKey::parse(&raw).is_err());
        }
    }
}

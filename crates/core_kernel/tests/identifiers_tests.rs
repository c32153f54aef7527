//! Unit tests for the Identifiers module

use core_kernel::{EntryId, LineId, OwnerId};
use uuid::Uuid;

mod owner_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        assert_ne!(OwnerId::new(), OwnerId::new());
    }

    #[test]
    fn test_parse_accepts_bare_uuid() {
        let uuid = Uuid::new_v4();
        let parsed: OwnerId = uuid.to_string().parse().unwrap();
        assert_eq!(*parsed.as_uuid(), uuid);
    }

    #[test]
    fn test_parse_accepts_prefixed_form() {
        let id = OwnerId::new();
        let display = id.to_string();
        assert!(display.starts_with("OWN-"));
        assert_eq!(display.parse::<OwnerId>().unwrap(), id);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("OWN-not-a-uuid".parse::<OwnerId>().is_err());
    }
}

mod entry_id_tests {
    use super::*;

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = EntryId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = EntryId::new_v7();
        let uuid1: Uuid = id1.into();
        let uuid2: Uuid = id2.into();
        assert!(uuid1 < uuid2);
    }

    #[test]
    fn test_prefixes_are_distinct() {
        assert_eq!(EntryId::prefix(), "JNL");
        assert_eq!(LineId::prefix(), "JNLL");
        assert_eq!(OwnerId::prefix(), "OWN");
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = EntryId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
        let back: EntryId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}

pub(super) const INSERT_ENTRY: &str = r#"
    INSERT INTO offline_queue (
        id,
        action_type,
        payload_ciphertext,
        created_at,
        attempt_count,
        last_error
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

pub(super) const UPSERT_ENTRY: &str = r#"
    INSERT INTO offline_queue (
        id,
        action_type,
        payload_ciphertext,
        created_at,
        attempt_count,
        last_error
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    ON CONFLICT(id) DO UPDATE SET
        action_type = excluded.action_type,
        payload_ciphertext = excluded.payload_ciphertext,
        created_at = excluded.created_at,
        attempt_count = excluded.attempt_count,
        last_error = excluded.last_error
"#;

pub(super) const SELECT_ENTRY_BY_ID: &str = r#"
    SELECT id, action_type, payload_ciphertext, created_at, attempt_count, last_error
    FROM offline_queue
    WHERE id = ?1
"#;

pub(super) const SELECT_ALL_ENTRIES: &str = r#"
    SELECT id, action_type, payload_ciphertext, created_at, attempt_count, last_error
    FROM offline_queue
    ORDER BY seq ASC
"#;

pub(super) const DELETE_ENTRY: &str = r#"
    DELETE FROM offline_queue
    WHERE id = ?1
"#;

pub(super) const COUNT_ENTRIES: &str = "SELECT COUNT(*) FROM offline_queue";

pub(super) const DELETE_ALL_ENTRIES: &str = "DELETE FROM offline_queue";

//! SQL schema for the Rolodex SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.
//!
//! Integrity lives here rather than in the calling code: email uniqueness,
//! the gender enumeration, the self-contact prohibition, cascading link
//! removal and `modified_at` maintenance are all enforced by SQLite itself.

/// Name of the CHECK constraint forbidding self-contacts; matched against
/// SQLite's error message to classify the failure.
pub const NO_SELF_CONTACT: &str = "no_self_contact";

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Timestamps are integer microseconds since the Unix epoch.
CREATE TABLE IF NOT EXISTS persons (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL CHECK (length(trim(name)) > 0),
    surname     TEXT NOT NULL CHECK (length(trim(surname)) > 0),
    gender      TEXT CHECK (gender IN ('male', 'female')),
    birthday    TEXT,            -- YYYY-MM-DD
    phone       TEXT,
    email       TEXT NOT NULL UNIQUE CHECK (length(trim(email)) > 0),
    created_at  INTEGER NOT NULL,
    modified_at INTEGER NOT NULL
);

-- Directed edge: person_id lists contact_id as a contact.
CREATE TABLE IF NOT EXISTS contact_links (
    person_id  TEXT NOT NULL REFERENCES persons(id) ON DELETE CASCADE,
    contact_id TEXT NOT NULL REFERENCES persons(id) ON DELETE CASCADE,
    PRIMARY KEY (person_id, contact_id),
    CONSTRAINT no_self_contact CHECK (person_id <> contact_id)
);

CREATE INDEX IF NOT EXISTS contact_links_contact_idx ON contact_links(contact_id);
CREATE INDEX IF NOT EXISTS persons_modified_idx     ON persons(modified_at);

-- Any update that does not set modified_at itself gets it bumped, strictly
-- past the previous value so two writes inside one clock tick still differ.
CREATE TRIGGER IF NOT EXISTS persons_touch_modified_at
AFTER UPDATE ON persons
FOR EACH ROW WHEN NEW.modified_at = OLD.modified_at
BEGIN
    UPDATE persons
       SET modified_at = max(
             CAST((julianday('now') - 2440587.5) * 86400000000 AS INTEGER),
             OLD.modified_at + 1
           )
     WHERE id = NEW.id;
END;

-- Losing a link changes the owner's aggregate, including through the cascade
-- when the contact itself is deleted.
CREATE TRIGGER IF NOT EXISTS contact_links_touch_owner
AFTER DELETE ON contact_links
FOR EACH ROW
BEGIN
    UPDATE persons SET modified_at = modified_at WHERE id = OLD.person_id;
END;

PRAGMA user_version = 1;
";

/// SQL-schema för släktregistret
///
/// Föräldrar och make/maka är självrefererande främmande nycklar i `people`.
/// Radering nollställer referenserna i stället för att lämna dem hängande.

pub const SCHEMA_VERSION: i32 = 2;

pub const CREATE_TABLES: &str = r#"
-- Personer
CREATE TABLE IF NOT EXISTS people (
    id TEXT PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    national_id TEXT NOT NULL UNIQUE,
    phone TEXT,
    bio TEXT,
    photo_ref TEXT,
    mother_id TEXT REFERENCES people(id) ON DELETE SET NULL,
    father_id TEXT REFERENCES people(id) ON DELETE SET NULL,
    spouse_id TEXT REFERENCES people(id) ON DELETE SET NULL,
    gender TEXT NOT NULL CHECK (gender IN ('female', 'male', 'other')),
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    CHECK (length(first_name) > 0 AND length(last_name) > 0),
    CHECK (mother_id IS NULL OR mother_id != id),
    CHECK (father_id IS NULL OR father_id != id),
    CHECK (spouse_id IS NULL OR spouse_id != id)
);

-- Vigselregister (endast tillägg)
CREATE TABLE IF NOT EXISTS marriages (
    id TEXT PRIMARY KEY,
    person1_id TEXT NOT NULL,
    person2_id TEXT NOT NULL,
    marriage_date TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'married',
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    FOREIGN KEY (person1_id) REFERENCES people(id),
    FOREIGN KEY (person2_id) REFERENCES people(id)
);

-- Migrationshistorik
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// Index för relationsuppslag (v2)
pub const CREATE_RELATION_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_people_mother ON people(mother_id);
CREATE INDEX IF NOT EXISTS idx_people_father ON people(father_id);
CREATE INDEX IF NOT EXISTS idx_people_spouse ON people(spouse_id);
CREATE INDEX IF NOT EXISTS idx_marriages_person1 ON marriages(person1_id);
CREATE INDEX IF NOT EXISTS idx_marriages_person2 ON marriages(person2_id);
"#;

//! Table definitions.

/// DDL for the `team` and `member` tables.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS "team" (
    "id" INTEGER PRIMARY KEY AUTOINCREMENT,
    "name" TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS "member" (
    "id" INTEGER PRIMARY KEY AUTOINCREMENT,
    "username" TEXT,
    "age" INTEGER NOT NULL DEFAULT 0,
    "team_id" INTEGER REFERENCES "team" ("id")
);

CREATE INDEX IF NOT EXISTS "idx_member_team_id" ON "member" ("team_id");
"#;

/// Drops both tables, members first.
pub const DROP_SCHEMA: &str = r#"
DROP TABLE IF EXISTS "member";
DROP TABLE IF EXISTS "team";
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_references_team() {
        assert!(SCHEMA.contains(r#""team_id" INTEGER REFERENCES "team" ("id")"#));
        assert!(SCHEMA.find("\"team\" (").unwrap() < SCHEMA.find("\"member\" (").unwrap());
    }
}

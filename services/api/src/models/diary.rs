//! Diary entries
//!
//! Entries written offline may carry their own `createdAt`.

use super::{CreatedAt, EntitySchema, Field};

pub static SCHEMA: EntitySchema = EntitySchema {
    name: "diary entry",
    table: "diaries",
    path: "diaries",
    required: &[Field::text("title", "title"), Field::text("body", "body")],
    optional: &[
        Field::text("date", "date"),
        Field::text("mood", "mood"),
        Field::text("weather", "weather"),
        Field::text("location", "location"),
        Field::text("privateNotes", "private_notes"),
    ],
    tags: true,
    created_at: CreatedAt::CallerOrServer,
    tracks_updates: false,
    global_list: true,
};

//! Quotes worth keeping

use super::{CreatedAt, EntitySchema, Field};

pub static SCHEMA: EntitySchema = EntitySchema {
    name: "quote",
    table: "quotes",
    path: "quotes",
    required: &[
        Field::text("title", "title"),
        Field::text("author", "author"),
        Field::text("description", "description"),
    ],
    optional: &[
        Field::text("source", "source"),
        Field::text("category", "category"),
        Field::text("date", "date"),
        Field::text("notes", "notes"),
    ],
    tags: true,
    created_at: CreatedAt::Untracked,
    tracks_updates: false,
    global_list: true,
};

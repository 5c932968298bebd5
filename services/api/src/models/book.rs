//! Books the user has read or wants to read

use super::{CreatedAt, EntitySchema, Field};

pub static SCHEMA: EntitySchema = EntitySchema {
    name: "book",
    table: "books",
    path: "books",
    required: &[
        Field::text("title", "title"),
        Field::text("author", "author"),
        Field::text("description", "description"),
    ],
    optional: &[
        Field::integer("publicationYear", "publication_year"),
        Field::text("genre", "genre"),
        Field::text("rating", "rating"),
        Field::integer("pages", "pages"),
        Field::text("status", "status"),
        Field::text("notes", "notes"),
    ],
    tags: true,
    created_at: CreatedAt::Server,
    tracks_updates: false,
    global_list: true,
};

use super::{CreatedAt, EntitySchema, Field};

pub static SCHEMA: EntitySchema = EntitySchema {
    name: "movie",
    table: "movies",
    path: "movies",
    required: &[
        Field::text("title", "title"),
        Field::text("director", "director"),
        Field::text("description", "description"),
    ],
    optional: &[
        Field::integer("releaseYear", "release_year"),
        Field::text("genre", "genre"),
        Field::text("rating", "rating"),
        Field::text("notes", "notes"),
    ],
    tags: false,
    created_at: CreatedAt::Untracked,
    tracks_updates: false,
    global_list: true,
};

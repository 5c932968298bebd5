//! Planned and completed activities
//!
//! Activities have the widest required set and are the only collection
//! without an unscoped listing.

use super::{CreatedAt, EntitySchema, Field};

pub static SCHEMA: EntitySchema = EntitySchema {
    name: "activity",
    table: "activities",
    path: "activities",
    required: &[
        Field::text("title", "title"),
        Field::text("description", "description"),
        Field::text("category", "category"),
        Field::text("date", "date"),
        Field::text("status", "status"),
        Field::text("priority", "priority"),
    ],
    optional: &[
        // Minutes
        Field::integer("duration", "duration"),
        Field::text("location", "location"),
        Field::text("notes", "notes"),
    ],
    tags: true,
    created_at: CreatedAt::Server,
    tracks_updates: true,
    global_list: false,
};

//! Typed client for the journal API
//!
//! [`JournalClient`] keeps the signed-in session, attaches the bearer token
//! to every call and clears the session when the server answers 401.
//! [`Collection`] layers the list view on top: local filtering, prepending
//! new records and optimistic deletes.
//!
//! ```no_run
//! # async fn demo() -> Result<(), client::ClientError> {
//! use client::{Book, Collection, JournalClient, RecordFilter};
//!
//! let journal = JournalClient::new("http://localhost:3000");
//! journal.login("alice", "pw123").await?;
//!
//! let mut books = Collection::<Book>::new(journal.clone());
//! books.load().await?;
//! books.set_filter(RecordFilter::search("dune"));
//! for book in books.visible() {
//!     println!("{}", book.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod collection;
pub mod error;
pub mod filter;
pub mod models;
pub mod session;

pub use client::JournalClient;
pub use collection::Collection;
pub use common::tags;
pub use error::ClientError;
pub use filter::RecordFilter;
pub use models::{Activity, Book, Diary, Entity, Movie, Quote};
pub use session::{Session, SessionStore};

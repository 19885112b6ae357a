//! Release notes grouping and rendering.

pub mod format;
pub mod terminal;
pub mod writer;

pub use format::{EntryGroup, NoteEntry, ReleaseNotes, RenderedEntry, RepoLinks};
pub use terminal::render_terminal;
pub use writer::{NotesContext, generate_summary, render_notes, render_release_notes};

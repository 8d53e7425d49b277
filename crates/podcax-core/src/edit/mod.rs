mod rename;
mod session;

pub use {rename::edited_name, session::EditSession};

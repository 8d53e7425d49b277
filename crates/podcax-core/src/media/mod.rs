mod handle;
mod store;

pub use {
    handle::{EditParams, MediaHandle, MediaId, MediaKind, MediaUri},
    store::{MediaStore, PreviewState},
};

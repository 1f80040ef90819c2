//! Channel routing for backends with a separate metadata channel.

use synclink_common::{RemoteFile, RemoteFileType};
use synclink_storage::ObjectStore;

/// Channel holding `file`.
///
/// Bulk data goes to the primary channel; everything else goes to the
/// metadata channel when the backend has one.
pub fn channel_for<'a>(store: &'a dyn ObjectStore, file: &RemoteFile) -> &'a dyn ObjectStore {
    if file.is_bulk_data() {
        store
    } else {
        store.metadata_channel().unwrap_or(store)
    }
}

/// Channels that may hold objects of `kind`.
///
/// Temp objects are split across both channels depending on their content,
/// so listing them visits both.
pub fn channels_for_kind(store: &dyn ObjectStore, kind: RemoteFileType) -> Vec<&dyn ObjectStore> {
    match (kind, store.metadata_channel()) {
        (_, None) | (RemoteFileType::Multichunk, _) => vec![store],
        (RemoteFileType::Temp, Some(metadata)) => vec![store, metadata],
        (_, Some(metadata)) => vec![metadata],
    }
}

use crate::audio::ResourceToken;
use crate::library::{AudioHandle, TrackId};

/// The one live reference to the track loaded in the media thread.
///
/// Deliberately not `Clone`: the controller holds at most one, and giving it
/// up through [`release`](Self::release) is the only way to get its token
/// back for the release command.
#[derive(Debug)]
pub struct BoundResource {
    token: ResourceToken,
    track: TrackId,
    handle: AudioHandle,
}

impl BoundResource {
    pub fn token(&self) -> ResourceToken {
        self.token
    }

    pub fn track(&self) -> TrackId {
        self.track
    }

    pub fn handle(&self) -> &AudioHandle {
        &self.handle
    }

    pub fn release(self) -> ResourceToken {
        self.token
    }
}

/// Hands out resource tokens; never reuses one.
#[derive(Debug, Default)]
pub struct ResourceMinter {
    next: u64,
}

impl ResourceMinter {
    pub fn bind(&mut self, track: TrackId, handle: AudioHandle) -> BoundResource {
        self.next += 1;
        BoundResource {
            token: ResourceToken(self.next),
            track,
            handle,
        }
    }
}

//! Element names, attribute names, and error messages as they appear on the
//! wire. Clients match these byte for byte.

pub mod elements {
    pub const SYNC_PULL: &str = "sync_pull";
    pub const SYNC_PUSH: &str = "sync_push";
    pub const PACK: &str = "pack";
}

pub mod attributes {
    pub const BRANCH: &str = "branch";
    pub const SERVER_USER: &str = "serverUser";
    pub const BASE: &str = "base";
    pub const TIP: &str = "tip";
    pub const START_COMMIT: &str = "start_commit";
    pub const LAST_COMMIT: &str = "last_commit";
}

pub mod messages {
    pub const PUSH_ACCESS_DENIED: &str = "Push: access to branch denied.";
    pub const PUSH_NO_SUCH_BRANCH: &str = "Push: no such branch.";
    pub const PUSH_IMPORT_FAILED: &str = "Push: unable to import pack.";
}

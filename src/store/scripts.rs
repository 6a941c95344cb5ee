use std::sync::LazyLock;

use redis::Script;

pub const DOCUMENT_CREATE_SCRIPT_BODY: &str = include_str!("../lua/document_create.lua");
pub const DOCUMENT_UPDATE_SCRIPT_BODY: &str = include_str!("../lua/document_update.lua");
pub const PROFILE_SAVE_SCRIPT_BODY: &str = include_str!("../lua/profile_save.lua");

pub static DOCUMENT_CREATE_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(DOCUMENT_CREATE_SCRIPT_BODY));
pub static DOCUMENT_UPDATE_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(DOCUMENT_UPDATE_SCRIPT_BODY));
pub static PROFILE_SAVE_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(PROFILE_SAVE_SCRIPT_BODY));

/// Default page size for `GET /pets`
pub const DEFAULT_LIMIT: i64 = 20;

/// Default page start for `GET /pets`
pub const DEFAULT_OFFSET: i64 = 0;

/// Format of `created_at` in pet responses
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// =============================================================================
// MESSAGES
// =============================================================================

pub const MSG_INVALID_API_KEY: &str = "API KEY is not valid";

pub const MSG_INCORRECT_ID: &str = "Incorrect ID";

pub const MSG_PET_NOT_FOUND: &str = "Pet with the matching ID was not found.";

pub const MSG_FIELD_REQUIRED: &str = "This field is required.";

pub const MSG_NO_FILE_ATTACHED: &str = "Request has no resource file attached";

pub const MSG_HAS_PHOTOS_NOT_BOOLEAN: &str = "has_photos should be boolean field";

pub const MSG_BAD_PAGINATION: &str = "limit and offset should be positive integer value";

pub const MSG_IDS_NOT_LIST: &str = "ids field should be a list with id values";

pub const MSG_PHOTOS_ON_CREATE: &str = "To upload photo use endpoint POST /pets/{id}/photo";

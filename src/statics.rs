// Central place for presets, catalog field names and change-description strings.
// Keep these out of controller/history code to reduce duplication and make tweaks safer.

// Page-size presets per editor.
pub const PAGE_SIZE_PARAMS: usize = 300;
pub const PAGE_SIZE_AI: usize = 200;
pub const PAGE_SIZE_MAPS: usize = 10;
pub const PAGE_SIZE_DEFAULT: usize = PAGE_SIZE_PARAMS;

// Catalog file structure keys.
pub const CAT_CATEGORIES: &str = "categories";
pub const CAT_KIND: &str = "kind";
pub const CAT_ENTRIES: &str = "entries";
pub const CAT_FIELD_KEY: &str = "key";
pub const CAT_FIELD_TEXT: &str = "text";
pub const CAT_GOAL_ID: &str = "id";
pub const CAT_GOAL_TYPE: &str = "type";

pub const CAT_KIND_LIST: &str = "list";
pub const CAT_KIND_KEYED: &str = "keyed";

// Goal types (AI scripts).
pub const GOAL_TYPE_BATTLE: &str = "battle";
pub const GOAL_TYPE_LOGIC: &str = "logic";
pub const GOAL_TYPE_NEITHER: &str = "neither";

// English strings (EN_ prefix to make future localization easier).
pub const EN_FIELD_TEXT: &str = "entry text";
pub const EN_FIELD_KEY: &str = "entry ID";

pub const EN_ERR_EMPTY_TEXT: &str = "entry text cannot be empty";
pub const EN_ERR_EMPTY_NAME: &str = "entry name cannot be empty";
pub const EN_ERR_INVALID_ID_INTEGER: &str = "ID must be an integer";
pub const EN_ERR_NEGATIVE_ID: &str = "entry ID cannot be negative";
pub const EN_ERR_EMPTY_QUERY: &str = "search query cannot be empty";
pub const EN_ERR_OFFSET_UNSUPPORTED: &str = "entries of this kind cannot be offset";
pub const EN_ERR_TAG_UNSUPPORTED: &str = "entries of this kind have no type to change";

pub const EN_PREFIX_UNDO: &str = "Undo:";
pub const EN_PREFIX_REDO: &str = "Redo:";

pub const EN_LITERAL_EMPTY: &str = "<empty>";

// Newline constants (used for catalog formatting; keep out of catalog code).
pub const NL_LF: &str = "\n";
pub const NL_CRLF: &str = "\r\n";

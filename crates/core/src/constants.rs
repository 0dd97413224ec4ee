//! Constants used throughout the OPAL core crate.
//!
//! Default values for configuration, URL conventions and well-known column and field
//! names live here so the controller, the summary and the binaries agree on them.

/// Root of the modal template URLs; a column's template is `<root>/<column>.html/`.
pub const DEFAULT_MODAL_TEMPLATE_ROOT: &str = "/templates/modals";

/// Controller identifier handed to the modal service for item edits.
pub const EDIT_ITEM_CONTROLLER: &str = "EditItemModalCtrl";

/// Prefix of the episode detail link built by the patient summary.
pub const DEFAULT_EPISODE_LINK_PREFIX: &str = "#/episode/";

/// Text format of `date` fields in raw payloads.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Key holding the record/item identifier in raw payloads.
pub const ID_KEY: &str = "id";

/// Column carrying the ward tags of a patient.
pub const LOCATION_COLUMN: &str = "location";

/// Field of [`LOCATION_COLUMN`] carrying the ward tags.
pub const TAGS_FIELD: &str = "tags";

/// Separator used when joining summary categories.
pub const CATEGORY_SEPARATOR: &str = ", ";

//! UI runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into the list controller and summary builders. Library code never reads environment
//! variables itself; binaries collect the raw values and hand them to [`UiConfig::from_values`].

use crate::constants::{
    DEFAULT_EPISODE_LINK_PREFIX, DEFAULT_MODAL_TEMPLATE_ROOT, EDIT_ITEM_CONTROLLER,
};
use crate::{OpalError, OpalResult};

/// UI configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UiConfig {
    modal_template_root: String,
    edit_controller: String,
    episode_link_prefix: String,
}

impl UiConfig {
    /// Create a new `UiConfig`.
    ///
    /// A trailing `/` on `modal_template_root` is dropped so template URLs never contain `//`.
    pub fn new(
        modal_template_root: impl Into<String>,
        edit_controller: impl Into<String>,
        episode_link_prefix: impl Into<String>,
    ) -> OpalResult<Self> {
        let modal_template_root = modal_template_root.into().trim().to_string();
        let edit_controller = edit_controller.into().trim().to_string();
        let episode_link_prefix = episode_link_prefix.into().trim().to_string();

        if !modal_template_root.starts_with('/') {
            return Err(OpalError::InvalidInput(
                "modal_template_root must be an absolute path".into(),
            ));
        }
        if edit_controller.is_empty() {
            return Err(OpalError::InvalidInput(
                "edit_controller cannot be empty".into(),
            ));
        }
        if episode_link_prefix.is_empty() {
            return Err(OpalError::InvalidInput(
                "episode_link_prefix cannot be empty".into(),
            ));
        }

        let modal_template_root = match modal_template_root.trim_end_matches('/') {
            "" => "/".to_string(),
            root => root.to_string(),
        };

        Ok(Self {
            modal_template_root,
            edit_controller,
            episode_link_prefix,
        })
    }

    /// Build a configuration from optional raw values (typically environment variables).
    ///
    /// `None` or whitespace-only values fall back to the defaults in [`crate::constants`].
    pub fn from_values(
        modal_template_root: Option<String>,
        edit_controller: Option<String>,
        episode_link_prefix: Option<String>,
    ) -> OpalResult<Self> {
        fn or_default(value: Option<String>, default: &str) -> String {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        }

        Self::new(
            or_default(modal_template_root, DEFAULT_MODAL_TEMPLATE_ROOT),
            or_default(edit_controller, EDIT_ITEM_CONTROLLER),
            or_default(episode_link_prefix, DEFAULT_EPISODE_LINK_PREFIX),
        )
    }

    pub fn modal_template_root(&self) -> &str {
        &self.modal_template_root
    }

    pub fn edit_controller(&self) -> &str {
        &self.edit_controller
    }

    pub fn episode_link_prefix(&self) -> &str {
        &self.episode_link_prefix
    }

    /// Template URL of the edit modal for `column_name`.
    pub fn modal_template_url(&self, column_name: &str) -> String {
        let root = self.modal_template_root.trim_end_matches('/');
        format!("{root}/{column_name}.html/")
    }

    /// Link to the detail view of an episode.
    pub fn episode_link(&self, episode_id: impl std::fmt::Display) -> String {
        format!("{}{}", self.episode_link_prefix, episode_id)
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            modal_template_root: DEFAULT_MODAL_TEMPLATE_ROOT.to_string(),
            edit_controller: EDIT_ITEM_CONTROLLER.to_string(),
            episode_link_prefix: DEFAULT_EPISODE_LINK_PREFIX.to_string(),
        }
    }
}

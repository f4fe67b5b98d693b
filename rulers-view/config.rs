//! Guide profiles: the behavior flags, sizes, caret handler and page-width
//! markers for a content type, with a default profile as fallback.

use std::collections::HashMap;

use rulers_core::{
  ConfigError,
  LineBehavior,
};
use serde::{
  Deserialize,
  Serialize,
};
use thiserror::Error;

use crate::caret::{
  CaretHandlerKind,
  CaretSelector,
  OnColumn,
};

#[derive(Debug, Error)]
pub enum ProfileError {
  #[error("invalid profile file: {0}")]
  Parse(#[from] toml::de::Error),
  #[error(transparent)]
  Config(#[from] ConfigError),
}

/// Guide policy for one content type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GuideProfile {
  pub behavior: LineBehavior,
  /// Columns per indent level; `None` falls back to the host setting.
  pub indent_size: Option<u32>,
  /// Columns per tab; `None` falls back to the host setting.
  pub tab_size: Option<u32>,
  /// Name of the caret handler, resolved through the registry.
  pub caret_handler: String,
  pub on_column: OnColumn,
  /// Columns carrying whole-document page-width markers.
  pub page_width_markers: Vec<u32>,
}

impl Default for GuideProfile {
  fn default() -> Self {
    Self {
      behavior: LineBehavior::default(),
      indent_size: None,
      tab_size: None,
      caret_handler: CaretHandlerKind::NearestLeft.name().to_string(),
      on_column: OnColumn::default(),
      page_width_markers: Vec::new(),
    }
  }
}

impl GuideProfile {
  /// The configured caret handler. An unknown name disables highlighting
  /// rather than failing the view.
  pub fn caret_handler(&self) -> CaretHandlerKind {
    match CaretHandlerKind::from_name(&self.caret_handler) {
      Ok(kind) => kind,
      Err(err) => {
        log::warn!("{err}; falling back to `none`");
        CaretHandlerKind::None
      },
    }
  }

  pub fn selector(&self, indent_size: u32) -> CaretSelector {
    self.caret_handler().selector(indent_size, self.on_column)
  }
}

/// All profiles for a host: one default plus per-content-type overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GuideProfiles {
  pub default: GuideProfile,
  pub content_types: HashMap<String, GuideProfile>,
}

impl GuideProfiles {
  pub fn from_toml(text: &str) -> Result<Self, ProfileError> {
    let profiles: GuideProfiles = toml::from_str(text)?;
    profiles.validate()?;
    Ok(profiles)
  }

  /// Reject sizes that could never construct an analyzer. An unknown caret
  /// handler name is deliberately not fatal here; it degrades to `none` when
  /// the selector is built.
  fn validate(&self) -> Result<(), ConfigError> {
    for profile in std::iter::once(&self.default).chain(self.content_types.values()) {
      if profile.indent_size == Some(0) {
        return Err(ConfigError::IndentSize(0));
      }
      if profile.tab_size == Some(0) {
        return Err(ConfigError::TabSize(0));
      }
    }
    Ok(())
  }

  /// Profile for a content type, falling back to the default.
  pub fn profile(&self, content_type: Option<&str>) -> &GuideProfile {
    content_type
      .and_then(|name| self.content_types.get(name))
      .unwrap_or(&self.default)
  }
}

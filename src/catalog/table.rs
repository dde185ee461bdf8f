use std::{
    collections::BTreeSet,
    path::Path,
    sync::{Arc, LazyLock},
};

use anyhow::Context;

use crate::effects::filter::parse_filter;
use crate::foundation::error::{FrameshotError, FrameshotResult};

#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
/// Selectable background image.
pub struct Background {
    /// Stable identifier within the catalog.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Image reference resolved through a [`crate::ResourceResolver`].
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
/// Selectable filter effect.
pub struct Effect {
    /// Stable identifier within the catalog.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// CSS-like filter expression, e.g. `blur(3px)`.
    #[serde(alias = "filter", alias = "filterExpression")]
    pub filter_expression: String,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
/// Immutable table of backgrounds and effects, shared by every session.
pub struct Catalog {
    backgrounds: Vec<Arc<Background>>,
    effects: Vec<Arc<Effect>>,
}

#[derive(serde::Deserialize)]
struct CatalogFile {
    #[serde(default)]
    backgrounds: Vec<Background>,
    #[serde(default)]
    effects: Vec<Effect>,
}

const BUILTIN_BACKGROUND_URLS: [&str; 3] = [
    "https://images.unsplash.com/photo-1557683316-973673baf926?w=1600&h=900&fit=crop",
    "https://images.unsplash.com/photo-1560015534-cee980ba7e13?w=1600&h=900&fit=crop",
    "https://images.unsplash.com/photo-1501696461415-6bd6660c6742?w=1600&h=900&fit=crop",
];

const BUILTIN_EFFECT_COUNT: u32 = 100;

static BUILTIN: LazyLock<Catalog> = LazyLock::new(|| {
    let backgrounds = BUILTIN_BACKGROUND_URLS
        .iter()
        .zip(0u32..)
        .map(|(url, id)| Background {
            id,
            name: format!("Background {}", id + 1),
            url: (*url).to_string(),
        })
        .collect();
    let effects = (0..BUILTIN_EFFECT_COUNT)
        .map(|id| Effect {
            id,
            name: format!("Effect {}", id + 1),
            filter_expression: format!("blur({}px)", id % 10),
        })
        .collect();
    Catalog::from_parts_unchecked(backgrounds, effects)
});

impl Catalog {
    /// Process-wide builtin catalog.
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    /// Build a validated catalog from owned entries.
    pub fn new(backgrounds: Vec<Background>, effects: Vec<Effect>) -> FrameshotResult<Self> {
        let catalog = Self::from_parts_unchecked(backgrounds, effects);
        catalog.validate()?;
        Ok(catalog)
    }

    fn from_parts_unchecked(backgrounds: Vec<Background>, effects: Vec<Effect>) -> Self {
        Self {
            backgrounds: backgrounds.into_iter().map(Arc::new).collect(),
            effects: effects.into_iter().map(Arc::new).collect(),
        }
    }

    /// Parse and validate a catalog from JSON text.
    pub fn from_json(json: &str) -> FrameshotResult<Self> {
        let file: CatalogFile = serde_json::from_str(json)
            .map_err(|e| FrameshotError::serde(format!("catalog json: {e}")))?;
        Self::new(file.backgrounds, file.effects)
    }

    /// Read, parse and validate a catalog file.
    pub fn from_path(path: impl AsRef<Path>) -> FrameshotResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read catalog '{}'", path.display()))?;
        Self::from_json(&json)
    }

    /// Check id uniqueness, non-empty references and parseable filter expressions.
    pub fn validate(&self) -> FrameshotResult<()> {
        let mut seen = BTreeSet::new();
        for bg in &self.backgrounds {
            if !seen.insert(bg.id) {
                return Err(FrameshotError::validation(format!(
                    "duplicate background id {}",
                    bg.id
                )));
            }
            if bg.url.trim().is_empty() {
                return Err(FrameshotError::validation(format!(
                    "background {} has an empty url",
                    bg.id
                )));
            }
        }

        seen.clear();
        for fx in &self.effects {
            if !seen.insert(fx.id) {
                return Err(FrameshotError::validation(format!(
                    "duplicate effect id {}",
                    fx.id
                )));
            }
            parse_filter(&fx.filter_expression)?;
        }
        Ok(())
    }

    /// Backgrounds in catalog order.
    pub fn backgrounds(&self) -> &[Arc<Background>] {
        &self.backgrounds
    }

    /// Effects in catalog order.
    pub fn effects(&self) -> &[Arc<Effect>] {
        &self.effects
    }

    /// Lookup a background by id.
    pub fn background(&self, id: u32) -> Option<Arc<Background>> {
        self.backgrounds.iter().find(|b| b.id == id).cloned()
    }

    /// Lookup an effect by id.
    pub fn effect(&self, id: u32) -> Option<Arc<Effect>> {
        self.effects.iter().find(|e| e.id == id).cloned()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/table.rs"]
mod tests;

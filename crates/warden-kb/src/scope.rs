//! Scope addressing for knowledge-base documents.
//!
//! Documents hang off a three-level hierarchy: an act, optionally a scene
//! within it, optionally a beat within that. Each level gets its own
//! directory subtree, so act-level and scene-level documents with the same
//! name never collide.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::error::{KbError, KbResult};

/// Where a document lives: an act, a scene, or a beat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KbScope {
    /// The act id. Always present.
    pub act: String,
    /// The scene id, for scene- and beat-level scopes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<String>,
    /// The beat id, for beat-level scopes. Requires a scene.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beat: Option<String>,
}

impl KbScope {
    /// An act-level scope.
    ///
    /// # Errors
    ///
    /// Rejects segments that are empty or contain `/`, `\`, or `..`.
    pub fn act(act: impl Into<String>) -> KbResult<Self> {
        let act = act.into();
        validate_segment(&act)?;
        Ok(Self {
            act,
            scene: None,
            beat: None,
        })
    }

    /// A scene-level scope.
    ///
    /// # Errors
    ///
    /// Rejects segments that are empty or contain `/`, `\`, or `..`.
    pub fn scene(act: impl Into<String>, scene: impl Into<String>) -> KbResult<Self> {
        let mut scope = Self::act(act)?;
        let scene = scene.into();
        validate_segment(&scene)?;
        scope.scene = Some(scene);
        Ok(scope)
    }

    /// A beat-level scope.
    ///
    /// # Errors
    ///
    /// Rejects segments that are empty or contain `/`, `\`, or `..`.
    pub fn beat(
        act: impl Into<String>,
        scene: impl Into<String>,
        beat: impl Into<String>,
    ) -> KbResult<Self> {
        let mut scope = Self::scene(act, scene)?;
        let beat = beat.into();
        validate_segment(&beat)?;
        scope.beat = Some(beat);
        Ok(scope)
    }

    /// Re-validate every segment. Deserialized scopes go through this before
    /// touching the filesystem.
    pub(crate) fn validate(&self) -> KbResult<()> {
        validate_segment(&self.act)?;
        if let Some(scene) = &self.scene {
            validate_segment(scene)?;
        }
        match &self.beat {
            Some(_) if self.scene.is_none() => Err(KbError::InvalidScope {
                segment: self.act.clone(),
                reason: "a beat scope requires a scene",
            }),
            Some(beat) => validate_segment(beat),
            None => Ok(()),
        }
    }

    /// The scope's directory relative to the store root:
    /// `acts/<act>[/scenes/<scene>[/beats/<beat>]]`.
    pub(crate) fn relative_root(&self) -> PathBuf {
        let mut root = PathBuf::from("acts");
        root.push(&self.act);
        if let Some(scene) = &self.scene {
            root.push("scenes");
            root.push(scene);
            if let Some(beat) = &self.beat {
                root.push("beats");
                root.push(beat);
            }
        }
        root
    }
}

impl fmt::Display for KbScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.act)?;
        if let Some(scene) = &self.scene {
            write!(f, "/{scene}")?;
        }
        if let Some(beat) = &self.beat {
            write!(f, "/{beat}")?;
        }
        Ok(())
    }
}

fn validate_segment(segment: &str) -> KbResult<()> {
    if segment.trim().is_empty() {
        return Err(KbError::InvalidScope {
            segment: segment.to_string(),
            reason: "must be non-empty",
        });
    }
    if segment.contains('/') || segment.contains('\\') || segment.contains("..") {
        return Err(KbError::InvalidScope {
            segment: segment.to_string(),
            reason: "must not contain path separators or '..'",
        });
    }
    Ok(())
}

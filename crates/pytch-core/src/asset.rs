//! Asset metadata and the `<actorId>/<basename>` naming convention.
//!
//! Assets (images and sounds) live outside the structured program. Each is
//! known by a full pathname whose first component is the owning actor's ID.
//! Flattening uses [`filter_by_actor`] to list an actor's costumes/backdrops
//! and sounds; names that do not follow the convention are skipped.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::ActorId;
use crate::skeleton::EmbodyContext;

/// Name and mime type of one project asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMetaData {
    pub name: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

impl AssetMetaData {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        AssetMetaData {
            name: name.into(),
            mime_type: mime_type.into(),
        }
    }

    /// The part of the mime type before the `/`, e.g. `"image"`.
    pub fn mime_major_type(&self) -> &str {
        mime_major_type(&self.mime_type)
    }
}

/// The two components of an asset's full pathname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPathComponents {
    #[serde(rename = "actorId")]
    pub actor_id: ActorId,
    pub basename: String,
}

/// An asset's full pathname together with its basename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetNames {
    #[serde(rename = "fullPathname")]
    pub full_pathname: String,
    pub basename: String,
}

/// One actor's assets, split by what they are used for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorAssets {
    pub appearances: Vec<AssetNames>,
    pub sounds: Vec<AssetNames>,
}

/// Returns the part of `mime_type` before the first `/`.
pub fn mime_major_type(mime_type: &str) -> &str {
    mime_type.split('/').next().unwrap_or(mime_type)
}

/// Splits `name` into its actor ID and basename.
pub fn path_components(name: &str) -> Result<AssetPathComponents, CoreError> {
    let invalid = || CoreError::InvalidAssetName {
        name: name.to_string(),
    };

    let (actor_part, basename) = name.split_once('/').ok_or_else(invalid)?;
    if basename.is_empty() || basename.contains('/') {
        return Err(invalid());
    }
    let actor_id = actor_part.parse().map_err(|_| invalid())?;

    Ok(AssetPathComponents {
        actor_id,
        basename: basename.to_string(),
    })
}

/// Returns the actor-ID component of `name`.
pub fn actor_id(name: &str) -> Result<ActorId, CoreError> {
    path_components(name).map(|c| c.actor_id)
}

/// Returns the basename component of `name`.
pub fn basename(name: &str) -> Result<String, CoreError> {
    path_components(name).map(|c| c.basename)
}

/// Returns the actor ID shared by two asset names, failing if they differ.
pub fn common_actor_id_component(first: &str, second: &str) -> Result<ActorId, CoreError> {
    let first_id = actor_id(first)?;
    let second_id = actor_id(second)?;
    if first_id != second_id {
        return Err(CoreError::DifferentActorIds {
            first: first.to_string(),
            second: second.to_string(),
        });
    }
    Ok(first_id)
}

/// Returns a predicate testing whether an asset belongs to `actor_id`.
/// Assets with malformed names belong to no actor.
pub fn belongs_to_actor(actor_id: ActorId) -> impl Fn(&AssetMetaData) -> bool {
    move |asset: &AssetMetaData| {
        path_components(&asset.name).map_or(false, |c| c.actor_id == actor_id)
    }
}

/// Returns the first asset of `actor_id` whose mime major type is `major_type`.
pub fn first_matching<'a>(
    assets: &'a [AssetMetaData],
    actor_id: ActorId,
    major_type: &str,
) -> Option<&'a AssetMetaData> {
    let belongs = belongs_to_actor(actor_id);
    assets
        .iter()
        .find(|a| belongs(*a) && a.mime_major_type() == major_type)
}

/// Returns `actor_id`'s images (appearances) and audio (sounds), in the
/// order they appear in `assets`.
pub fn filter_by_actor(assets: &[AssetMetaData], actor_id: ActorId) -> ActorAssets {
    let mut actor_assets = ActorAssets::default();

    for asset in assets {
        let Ok(components) = path_components(&asset.name) else {
            tracing::debug!(name = %asset.name, "skipping asset with malformed name");
            continue;
        };
        if components.actor_id != actor_id {
            continue;
        }

        let names = AssetNames {
            full_pathname: asset.name.clone(),
            basename: components.basename,
        };
        match asset.mime_major_type() {
            "image" => actor_assets.appearances.push(names),
            "audio" => actor_assets.sounds.push(names),
            _ => {}
        }
    }

    actor_assets
}

/// Guesses a mime type from the extension of `basename`.
pub fn guessed_mime_type(basename: &str) -> Result<&'static str, CoreError> {
    let unknown = |reason: &str| CoreError::UnknownMimeType {
        basename: basename.to_string(),
        reason: reason.to_string(),
    };

    let (_, extension) = basename
        .rsplit_once('.')
        .ok_or_else(|| unknown("no extension"))?;

    match extension.to_ascii_lowercase().as_str() {
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "gif" => Ok("image/gif"),
        "svg" => Ok("image/svg+xml"),
        "webp" => Ok("image/webp"),
        "mp3" => Ok("audio/mpeg"),
        "wav" => Ok("audio/wav"),
        "ogg" => Ok("audio/ogg"),
        "m4a" => Ok("audio/mp4"),
        _ => Err(unknown("unknown extension")),
    }
}

/// In-memory asset registrar.
///
/// Records every asset registered during skeleton embodiment under its
/// `<actorId>/<basename>` name, with a mime type guessed from the
/// extension. The collected list is suitable for flattening.
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    assets: Vec<AssetMetaData>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assets(&self) -> &[AssetMetaData] {
        &self.assets
    }

    pub fn into_assets(self) -> Vec<AssetMetaData> {
        self.assets
    }
}

impl EmbodyContext for AssetCatalog {
    fn register_actor_asset(
        &mut self,
        actor_id: ActorId,
        basename: &str,
    ) -> Result<(), CoreError> {
        let mime_type = guessed_mime_type(basename).map_err(|e| CoreError::AssetRegistration {
            actor: actor_id,
            basename: basename.to_string(),
            reason: e.to_string(),
        })?;
        self.assets
            .push(AssetMetaData::new(format!("{}/{}", actor_id, basename), mime_type));
        Ok(())
    }
}

use crate::models::AssetRef;

const CDN_HOST: &str = "cdn.sanity.io";

/// Requested transform for an image URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageSize {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ImageSize {
    pub const ORIGINAL: ImageSize = ImageSize { width: None, height: None };

    pub const fn width(width: u32) -> ImageSize {
        ImageSize { width: Some(width), height: None }
    }

    pub const fn exact(width: u32, height: u32) -> ImageSize {
        ImageSize { width: Some(width), height: Some(height) }
    }
}

/// Builds CDN URLs for image assets of one project/dataset.
#[derive(Debug, Clone)]
pub struct ImageUrls {
    project_id: String,
    dataset: String,
}

impl ImageUrls {
    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        ImageUrls {
            project_id: project_id.into(),
            dataset: dataset.into(),
        }
    }

    /// `image-<id>-<WxH>-<ext>` becomes `.../<id>-<WxH>.<ext>`. Returns `None`
    /// for references not in that form.
    pub fn url(&self, asset: &AssetRef, size: ImageSize) -> Option<String> {
        let (id, dims, ext) = parse_image_ref(&asset.reference)?;
        let mut url = format!(
            "https://{CDN_HOST}/images/{}/{}/{id}-{dims}.{ext}",
            self.project_id, self.dataset
        );

        let params: Vec<String> = [("w", size.width), ("h", size.height)]
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| format!("{key}={v}")))
            .collect();
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }
        Some(url)
    }
}

fn parse_image_ref(reference: &str) -> Option<(&str, &str, &str)> {
    let rest = reference.strip_prefix("image-")?;
    let mut parts = rest.rsplitn(3, '-');
    let ext = parts.next()?;
    let dims = parts.next()?;
    let id = parts.next()?;

    let (w, h) = dims.split_once('x')?;
    let numeric = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if id.is_empty() || ext.is_empty() || !numeric(w) || !numeric(h) {
        return None;
    }
    Some((id, dims, ext))
}

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Poster,
    Backdrop,
    Profile,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ImageSize {
    Small,
    #[default]
    Medium,
    Large,
    XLarge,
}

/// Provider size token for a (kind, size) pair. Pairs the provider does not
/// offer (a profile picture in `XLarge`) fall back to the kind's medium token.
pub fn size_token(kind: ImageKind, size: ImageSize) -> &'static str {
    let token = match (kind, size) {
        (ImageKind::Poster, ImageSize::Small) => Some("w154"),
        (ImageKind::Poster, ImageSize::Medium) => Some("w342"),
        (ImageKind::Poster, ImageSize::Large) => Some("w500"),
        (ImageKind::Poster, ImageSize::XLarge) => Some("w780"),
        (ImageKind::Backdrop, ImageSize::Small) => Some("w300"),
        (ImageKind::Backdrop, ImageSize::Medium) => Some("w780"),
        (ImageKind::Backdrop, ImageSize::Large) => Some("w1280"),
        (ImageKind::Backdrop, ImageSize::XLarge) => Some("original"),
        (ImageKind::Profile, ImageSize::Small) => Some("w45"),
        (ImageKind::Profile, ImageSize::Medium) => Some("w185"),
        (ImageKind::Profile, ImageSize::Large) => Some("h632"),
        (ImageKind::Profile, ImageSize::XLarge) => None,
    };
    match token {
        Some(token) => token,
        None => size_token(kind, ImageSize::Medium),
    }
}

/// Absolute asset URL, or `None` when there is no path (callers show a placeholder).
pub fn build_image_url(image_base_url: &str, path: Option<&str>, size: ImageSize, kind: ImageKind) -> Option<String> {
    let path = path.filter(|p| !p.is_empty())?;
    Some(format!("{}/{}{}", image_base_url, size_token(kind, size), path))
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageSize::Small => "small",
            ImageSize::Medium => "medium",
            ImageSize::Large => "large",
            ImageSize::XLarge => "xlarge",
        };
        f.write_str(name)
    }
}

impl FromStr for ImageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "small" => Ok(ImageSize::Small),
            "medium" => Ok(ImageSize::Medium),
            "large" => Ok(ImageSize::Large),
            "xlarge" => Ok(ImageSize::XLarge),
            _ => Err(format!("Invalid image size: {}. Use 'small', 'medium', 'large' or 'xlarge'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://image.tmdb.org/t/p";

    #[test]
    fn test_poster_url() {
        assert_eq!(
            build_image_url(BASE, Some("/p.jpg"), ImageSize::Medium, ImageKind::Poster),
            Some("https://image.tmdb.org/t/p/w342/p.jpg".to_string())
        );
        assert_eq!(
            build_image_url(BASE, Some("/b.jpg"), ImageSize::XLarge, ImageKind::Backdrop),
            Some("https://image.tmdb.org/t/p/original/b.jpg".to_string())
        );
    }

    #[test]
    fn test_missing_path_has_no_url() {
        assert_eq!(build_image_url(BASE, None, ImageSize::Large, ImageKind::Poster), None);
        assert_eq!(build_image_url(BASE, Some(""), ImageSize::Large, ImageKind::Poster), None);
    }

    #[test]
    fn test_unknown_pair_falls_back_to_medium() {
        assert_eq!(size_token(ImageKind::Profile, ImageSize::XLarge), "w185");
        assert_eq!(size_token(ImageKind::Profile, ImageSize::Large), "h632");
    }
}

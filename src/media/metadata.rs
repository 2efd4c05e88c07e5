use image::{ColorType, ImageReader};
use std::path::PathBuf;

use super::{MediaError, MediaKind, MediaLibrary, MediaLocation, MediaMetadata};

impl MediaLibrary {
    /// Dimensions, format, colour mode and size of an authorized photo.
    pub async fn photo_metadata(
        &self,
        location: &MediaLocation,
    ) -> Result<MediaMetadata, MediaError> {
        if location.kind != MediaKind::Photo {
            return Err(MediaError::UnsupportedType(location.filename.clone()));
        }

        let file_size = tokio::fs::metadata(&location.path).await?.len();
        let path = location.path.clone();
        let (width, height, format, color) = tokio::task::spawn_blocking(move || read_image(path))
            .await
            .map_err(|e| MediaError::TaskError(e.to_string()))??;

        Ok(MediaMetadata {
            filename: location.filename.clone(),
            dimensions: format!("{}x{}", width, height),
            format,
            mode: color_mode(color),
            size: format!("{:.2} MB", file_size as f64 / (1024.0 * 1024.0)),
        })
    }
}

fn read_image(path: PathBuf) -> Result<(u32, u32, Option<String>, ColorType), MediaError> {
    let reader = ImageReader::open(&path)?.with_guessed_format()?;
    let format = reader
        .format()
        .map(|f| format!("{:?}", f).to_uppercase());
    let image = reader.decode()?;
    Ok((image.width(), image.height(), format, image.color()))
}

fn color_mode(color: ColorType) -> String {
    match color {
        ColorType::L8 | ColorType::L16 => "L".to_string(),
        ColorType::La8 | ColorType::La16 => "LA".to_string(),
        ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => "RGB".to_string(),
        ColorType::Rgba8 | ColorType::Rgba16 | ColorType::Rgba32F => "RGBA".to_string(),
        other => format!("{:?}", other),
    }
}
